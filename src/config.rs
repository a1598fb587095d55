// src/config.rs

use lazy_static::lazy_static;

/// Name of the date column in the observation dataset.
pub const DATE_COLUMN: &str = "fecha";

/// In-store sales metric.
pub const SALES_COLUMN: &str = "negocio_ventas_presencial";

/// Wholesale electricity price (OMIE) metric.
pub const PRICE_COLUMN: &str = "precio_omie";

/// How many times a remote dataset fetch is attempted before giving up.
pub const MAX_LOAD_RETRIES: u32 = 5;

lazy_static! {
    /// Advertising-investment channels tracked by the default dataset.
    pub static ref INVESTMENT_CHANNELS: Vec<&'static str> = vec![
        "publicidad_inversion_tv_comercial_pre_covid",
        "publicidad_inversion_tv_comercial_post_covid",
        "publicidad_inversion_exterior_comercial",
        "publicidad_inversion_radio_comercial",
        "publicidad_inversion_prensa_comercial",
        "publicidad_inversion_brandformance_total",
        "publicidad_inversion_agencias_on_comercial_total",
    ];
}
