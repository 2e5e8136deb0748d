use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum InvestmentKind {
    #[serde(rename = "FD")]
    FixedDeposit,
    #[serde(rename = "SIP")]
    Sip,
    #[serde(rename = "PPF")]
    Ppf,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InvestmentCalcRequest {
    #[serde(rename = "type")]
    pub kind: InvestmentKind,
    #[serde(default)]
    pub principal: f64,
    #[serde(default)]
    pub monthly_amount: f64,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub years: u32,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct YearlyProjection {
    pub year: u32,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct InvestmentCalcResponse {
    #[serde(rename = "type")]
    pub kind: InvestmentKind,
    pub principal: f64,
    pub monthly_amount: f64,
    pub rate: f64,
    pub years: u32,
    pub total_invested: i64,
    pub total_returns: i64,
    pub maturity_amount: i64,
    pub projections: Vec<YearlyProjection>,
}
