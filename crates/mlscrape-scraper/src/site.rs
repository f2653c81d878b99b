//! Marketplace endpoints and URL templates.

/// URLs and constants for one marketplace locale.
///
/// Normalizers and operations read every host from here so tests can point
/// the whole pipeline at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceSite {
    /// First page of the daily offers listing.
    pub offers_url: String,
    /// Host for search listings; the query becomes the first path segment.
    pub search_base_url: String,
    /// Host for catalog product pages (`{base}/p/{product_id}`).
    pub product_base_url: String,
    /// Host for plain listing pages without a catalog id.
    pub article_base_url: String,
    /// CDN template; `{id}` is replaced by the picture id.
    pub image_url_template: String,
    /// Fixed currency for every price on the site.
    pub currency: String,
}

impl Default for MarketplaceSite {
    fn default() -> Self {
        Self {
            offers_url: "https://www.mercadolibre.com.mx/ofertas".to_owned(),
            search_base_url: "https://listado.mercadolibre.com.mx".to_owned(),
            product_base_url: "https://www.mercadolibre.com.mx".to_owned(),
            article_base_url: "https://articulo.mercadolibre.com.mx".to_owned(),
            image_url_template: "https://http2.mlstatic.com/D_Q_NP_2X_{id}-AB.webp".to_owned(),
            currency: "MXN".to_owned(),
        }
    }
}

impl MarketplaceSite {
    /// Site whose every endpoint lives under `base_url`. Used against mock servers.
    #[must_use]
    pub fn rooted_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            offers_url: format!("{base}/ofertas"),
            search_base_url: base.to_owned(),
            product_base_url: base.to_owned(),
            article_base_url: base.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn image_url(&self, picture_id: &str) -> String {
        self.image_url_template.replacen("{id}", picture_id, 1)
    }

    #[must_use]
    pub fn catalog_product_url(&self, product_id: &str) -> String {
        format!("{}/p/{product_id}", self.product_base_url)
    }

    /// Builds the first search page URL for `query`.
    ///
    /// Whitespace runs become `-` in the path; the fragment repeats the
    /// query with `%20` separators the way the site's own search box does.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let slug = query.split_whitespace().collect::<Vec<_>>().join("-");
        let fragment = slug.replace('-', "%20");
        format!("{}/{slug}#D[A:{fragment}]", self.search_base_url)
    }
}
