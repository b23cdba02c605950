//! Quote pricing - sizes a solar system from a customer's usage and prices it.
//!
//! The calculator is pure apart from two reads through [`Settings`]: the price per watt
//! for the property type and the savings per kWh. Missing pricing settings fall back to
//! the values in [`PricingConfig`].

use crate::{
    config::PricingConfig,
    core::settings::{
        COST_PER_WATT_COMMERCIAL, COST_PER_WATT_RESIDENTIAL, SAVINGS_PER_KWH, Settings,
    },
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

/// Hybrid sizing factor covering daytime load plus battery charging.
pub const HYBRID_SIZING_FACTOR: f64 = 1.8;
/// Assumed monthly generation per installed kW.
pub const MONTHLY_KWH_PER_KW: f64 = 135.0;
/// Roof area needed per installed kW.
pub const ROOF_AREA_PER_KW: f64 = 100.0;
/// Roof size the quote form sends when the customer leaves the field alone.
pub const UNSPECIFIED_ROOF_SENTINEL: f64 = 2000.0;
/// Area substituted for an unspecified roof, large enough for industrial systems.
pub const UNSPECIFIED_ROOF_AREA: f64 = 5_000_000.0;
/// Rated output of one panel in kW.
pub const PANEL_RATING_KW: f64 = 0.55;
/// Smallest system offered, in panels.
pub const MIN_PANEL_COUNT: u64 = 6;
/// Largest panel count whose capacity is still exact in `f64` arithmetic.
pub const MAX_PANEL_COUNT: u64 = 1 << 53;
/// Assumed yearly generation per installed kW.
pub const ANNUAL_KWH_PER_KW: f64 = 1200.0;

/// Property classification driving the price per watt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Homes
    #[default]
    Residential,
    /// Everything else
    Commercial,
}

impl PropertyType {
    /// Settings key holding this property type's price per watt.
    #[must_use]
    pub const fn cost_per_watt_key(self) -> &'static str {
        match self {
            Self::Residential => COST_PER_WATT_RESIDENTIAL,
            Self::Commercial => COST_PER_WATT_COMMERCIAL,
        }
    }

    const fn fallback_cost_per_watt(self, pricing: &PricingConfig) -> f64 {
        match self {
            Self::Residential => pricing.cost_per_watt_residential,
            Self::Commercial => pricing.cost_per_watt_commercial,
        }
    }
}

impl FromStr for PropertyType {
    type Err = std::convert::Infallible;

    /// Only the exact text `residential` is residential; anything else is commercial.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "residential" {
            Ok(Self::Residential)
        } else {
            Ok(Self::Commercial)
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Residential => f.write_str("residential"),
            Self::Commercial => f.write_str("commercial"),
        }
    }
}

/// Validated calculator input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteRequest {
    /// Declared monthly usage
    pub monthly_usage: f64,
    /// Available roof area; `None` when the customer did not give one
    pub roof_size: Option<f64>,
    /// Property classification
    pub property_type: PropertyType,
}

impl QuoteRequest {
    /// Builds a request from the numbers the quote form submits.
    ///
    /// A roof size equal to [`UNSPECIFIED_ROOF_SENTINEL`] means the field was left at
    /// its placeholder and is treated as unspecified.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] for negative or non-finite numbers, or when the
    /// system would need more than [`MAX_PANEL_COUNT`] panels.
    pub fn new(monthly_usage: f64, roof_size: f64, property_type: PropertyType) -> Result<Self> {
        let monthly_usage = check_quantity("monthly usage", monthly_usage)?;
        let roof_size = check_quantity("roof size", roof_size)?;

        #[allow(clippy::float_cmp)]
        let roof_size = (roof_size != UNSPECIFIED_ROOF_SENTINEL).then_some(roof_size);

        let request = Self {
            monthly_usage,
            roof_size,
            property_type,
        };

        #[allow(clippy::cast_precision_loss)]
        let max_panels = MAX_PANEL_COUNT as f64;
        if (request.system_size_kw() / PANEL_RATING_KW).ceil() > max_panels {
            return Err(Error::invalid_input(
                "requested system is too large to quote",
            ));
        }

        Ok(request)
    }

    /// Builds a request from raw form fields.
    ///
    /// A missing property type defaults to residential.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] when usage or roof size is missing or not a number.
    pub fn parse(
        monthly_usage: Option<&str>,
        roof_size: Option<&str>,
        property_type: Option<&str>,
    ) -> Result<Self> {
        let monthly_usage = parse_quantity("monthly usage", monthly_usage)?;
        let roof_size = parse_quantity("roof size", roof_size)?;
        let property_type = property_type
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self::new(monthly_usage, roof_size, property_type)
    }

    /// Largest system the roof can hold, in kW.
    #[must_use]
    pub fn roof_ceiling_kw(&self) -> f64 {
        self.roof_size.unwrap_or(UNSPECIFIED_ROOF_AREA) / ROOF_AREA_PER_KW
    }

    /// System needed to cover the usage, in kW, before the roof ceiling.
    #[must_use]
    pub fn usage_size_kw(&self) -> f64 {
        self.monthly_usage * HYBRID_SIZING_FACTOR / MONTHLY_KWH_PER_KW
    }

    /// Continuous system size: the usage need capped by the roof.
    #[must_use]
    pub fn system_size_kw(&self) -> f64 {
        self.usage_size_kw().min(self.roof_ceiling_kw())
    }
}

fn check_quantity(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::invalid_input(format!("{field} must be a number")));
    }
    if value < 0.0 {
        return Err(Error::invalid_input(format!("{field} cannot be negative")));
    }
    Ok(value)
}

fn parse_quantity(field: &str, raw: Option<&str>) -> Result<f64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_input(format!("{field} is required")))?;

    raw.parse::<f64>()
        .map_err(|_| Error::invalid_input(format!("could not convert {field} '{raw}' to a number")))
}

/// Recommended system and its financial outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    /// Installed capacity in kW (whole panels), 2 decimals
    #[serde(rename = "systemSize")]
    pub system_size_kw: f64,
    /// Number of panels, never below [`MIN_PANEL_COUNT`]
    pub panel_count: u64,
    /// Capital cost, 2 decimals
    pub system_cost: f64,
    /// Always 0; no incentive is modelled
    pub tax_credit: f64,
    /// Equal to `system_cost`
    pub net_cost: f64,
    /// Yearly savings, 2 decimals
    pub annual_savings: f64,
    /// Years to recover the net cost, 1 decimal; 0 when there are no savings
    pub payback_period: f64,
}

impl QuoteResult {
    /// Unrounded capacity of the panels, `panel_count * PANEL_RATING_KW`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn panel_capacity_kw(&self) -> f64 {
        self.panel_count as f64 * PANEL_RATING_KW
    }
}

/// Sizes and prices systems using the current settings.
#[derive(Debug, Clone, Copy)]
pub struct QuoteCalculator<'a> {
    settings: Settings<'a>,
    pricing: &'a PricingConfig,
}

impl<'a> QuoteCalculator<'a> {
    /// Creates a calculator reading prices through `settings`, falling back to `pricing`.
    #[must_use]
    pub const fn new(settings: Settings<'a>, pricing: &'a PricingConfig) -> Self {
        Self { settings, pricing }
    }

    /// Computes the quote for a validated request.
    pub async fn calculate(&self, request: &QuoteRequest) -> QuoteResult {
        let cost_per_watt = self
            .settings
            .get_f64(
                request.property_type.cost_per_watt_key(),
                request.property_type.fallback_cost_per_watt(self.pricing),
            )
            .await;
        let savings_per_kwh = self
            .settings
            .get_f64(SAVINGS_PER_KWH, self.pricing.savings_per_kwh)
            .await;

        price_system(request, cost_per_watt, savings_per_kwh)
    }

    /// Validates raw numbers and computes the quote.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] for negative or non-finite numbers.
    pub async fn quote(
        &self,
        monthly_usage: f64,
        roof_size: f64,
        property_type: PropertyType,
    ) -> Result<QuoteResult> {
        let request = QuoteRequest::new(monthly_usage, roof_size, property_type)?;
        Ok(self.calculate(&request).await)
    }
}

/// Number of panels covering `system_size_kw`, at least [`MIN_PANEL_COUNT`].
///
/// Exact up to [`MAX_PANEL_COUNT`], which [`QuoteRequest::new`] enforces.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn panel_count_for(system_size_kw: f64) -> u64 {
    let needed = (system_size_kw / PANEL_RATING_KW).ceil() as u64;
    needed.max(MIN_PANEL_COUNT)
}

/// The sizing and pricing arithmetic, given resolved prices.
#[must_use]
pub fn price_system(request: &QuoteRequest, cost_per_watt: f64, savings_per_kwh: f64) -> QuoteResult {
    let usage_size_kw = request.usage_size_kw();
    let roof_ceiling_kw = request.roof_ceiling_kw();
    let system_size_kw = request.system_size_kw();

    let panel_count = panel_count_for(system_size_kw);
    #[allow(clippy::cast_precision_loss)]
    let real_system_size_kw = panel_count as f64 * PANEL_RATING_KW;

    let system_cost = real_system_size_kw * 1000.0 * cost_per_watt;
    let annual_generation_kwh = real_system_size_kw * ANNUAL_KWH_PER_KW;
    let annual_savings = annual_generation_kwh * savings_per_kwh;

    let tax_credit = 0.0;
    let net_cost = system_cost;
    let payback_period = if annual_savings > 0.0 {
        round_to(net_cost / annual_savings, 1)
    } else {
        0.0
    };

    debug!(
        usage_size_kw,
        roof_ceiling_kw,
        panel_count,
        cost_per_watt,
        savings_per_kwh,
        "Sized {} system",
        request.property_type
    );

    QuoteResult {
        system_size_kw: round_to(real_system_size_kw, 2),
        panel_count,
        system_cost: round_to(system_cost, 2),
        tax_credit: round_to(tax_credit, 2),
        net_cost: round_to(net_cost, 2),
        annual_savings: round_to(annual_savings, 2),
        payback_period,
    }
}

// Ties go to the even digit, as the quote page has always rounded
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
