use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router, extract::State, middleware, response::IntoResponse};

use crate::web::dto::investments::{
    InvestmentCalcRequest, InvestmentCalcResponse, InvestmentKind, YearlyProjection,
};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebResult, middlewares};

/// PPF accounts mature after 15 years; longer horizons are capped.
const PPF_MAX_MONTHS: u32 = 180;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/calculate", post(investments_calculate_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/investments/calculate",
    description = "Project FD/SIP/PPF returns over the given horizon",
    request_body = InvestmentCalcRequest,
    responses(
        (status = 200, description = "Projection computed", body = InvestmentCalcResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "investments"
)]
async fn investments_calculate_handler(
    State(_state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<InvestmentCalcRequest>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;

    Ok((StatusCode::OK, Json(project(req))))
}

fn compound(principal: f64, annual_rate: f64, years: f64) -> f64 {
    principal * (1.0 + annual_rate).powf(years)
}

/// Classic SIP maturity: P * [((1 + r)^n - 1) / r] * (1 + r) with a monthly
/// rate. A zero rate degenerates to plain accumulation.
fn sip_maturity(monthly_amount: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return monthly_amount * months as f64;
    }
    monthly_amount * (((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate)
        * (1.0 + monthly_rate)
}

pub fn project(req: InvestmentCalcRequest) -> InvestmentCalcResponse {
    let mut total_invested = 0.0;
    let mut maturity = 0.0;
    let mut projections = Vec::new();

    match req.kind {
        InvestmentKind::FixedDeposit => {
            let annual_rate = req.rate / 100.0;
            total_invested = req.principal;
            maturity = compound(req.principal, annual_rate, req.years as f64);

            for year in 0..=req.years {
                projections.push(YearlyProjection {
                    year,
                    amount: compound(req.principal, annual_rate, year as f64).round() as i64,
                });
            }
        }
        InvestmentKind::Sip | InvestmentKind::Ppf => {
            let monthly_rate = req.rate / 100.0 / 12.0;
            let mut months = req.years * 12;
            if req.kind == InvestmentKind::Ppf {
                months = months.min(PPF_MAX_MONTHS);
            }

            total_invested = req.monthly_amount * months as f64;
            maturity = sip_maturity(req.monthly_amount, monthly_rate, months);

            let mut elapsed = 12;
            while elapsed <= months {
                projections.push(YearlyProjection {
                    year: elapsed / 12,
                    amount: sip_maturity(req.monthly_amount, monthly_rate, elapsed).round() as i64,
                });
                elapsed += 12;
            }
        }
    }

    InvestmentCalcResponse {
        kind: req.kind,
        principal: req.principal,
        monthly_amount: req.monthly_amount,
        rate: req.rate,
        years: req.years,
        total_invested: total_invested.round() as i64,
        total_returns: (maturity - total_invested).round() as i64,
        maturity_amount: maturity.round() as i64,
        projections,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn request(kind: InvestmentKind, principal: f64, monthly: f64, rate: f64, years: u32) -> InvestmentCalcRequest {
        InvestmentCalcRequest {
            kind,
            principal,
            monthly_amount: monthly,
            rate,
            years,
        }
    }

    #[test]
    fn fd_compounds_annually() {
        let res = project(request(InvestmentKind::FixedDeposit, 100_000.0, 0.0, 7.0, 5));
        assert_eq!(res.total_invested, 100_000);
        // 100000 * 1.07^5
        assert_eq!(res.maturity_amount, 140_255);
        assert_eq!(res.total_returns, 40_255);
        assert_eq!(res.projections.len(), 6); // year 0 through 5
        assert_eq!(res.projections[0].amount, 100_000);
    }

    #[test]
    fn sip_accumulates_monthly() {
        let res = project(request(InvestmentKind::Sip, 0.0, 5_000.0, 12.0, 10));
        assert_eq!(res.total_invested, 600_000);
        assert!(res.maturity_amount > res.total_invested);
        assert_eq!(res.projections.len(), 10);
        assert_eq!(res.projections.last().unwrap().amount, res.maturity_amount);
    }

    #[test]
    fn sip_with_zero_rate_is_plain_savings() {
        let res = project(request(InvestmentKind::Sip, 0.0, 1_000.0, 0.0, 2));
        assert_eq!(res.total_invested, 24_000);
        assert_eq!(res.maturity_amount, 24_000);
        assert_eq!(res.total_returns, 0);
    }

    #[test]
    fn ppf_caps_at_fifteen_years() {
        let res = project(request(InvestmentKind::Ppf, 0.0, 1_000.0, 7.1, 25));
        assert_eq!(res.total_invested, 180_000); // 15 years of deposits
        assert_eq!(res.projections.last().unwrap().year, 15);
    }
}
