use axum::extract::{Path, Query, State};
use axum::Json;
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::chain::LedgerInfo;
use crate::domain::primitives::u256_dec;
use crate::domain::{parse_address, Address, Asset, SignedOrder};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct BalancesQuery {
    pub account: String,
    /// Comma-separated asset list; ether when absent.
    pub assets: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub account: Address,
    pub balances: Vec<BalanceDto>,
}

#[derive(Debug, Serialize)]
pub struct BalanceDto {
    pub asset: Asset,
    #[serde(with = "u256_dec")]
    pub amount: U256,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub order: SignedOrder,
    /// Optional dry-run fill of this size by `taker`.
    #[serde(default, with = "optional_amount")]
    pub amount: Option<U256>,
    pub taker: Option<Address>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_hash: H256,
    pub signature_valid: bool,
    #[serde(with = "u256_dec")]
    pub amount_filled: U256,
    #[serde(with = "u256_dec")]
    pub available_volume: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_trade: Option<bool>,
}

pub async fn get_ledger(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LedgerInfo>, AppError> {
    let address = parse_address(&address)?;
    let info = state
        .node
        .read(|chain| chain.ledger_info(&address))
        .await
        .map_err(crate::node::NodeError::from)?;
    Ok(Json(info))
}

pub async fn get_balances(
    Path(address): Path<String>,
    Query(params): Query<BalancesQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalancesResponse>, AppError> {
    let ledger = parse_address(&address)?;
    let account = parse_address(&params.account)?;
    let assets = match params.assets.as_deref() {
        None | Some("") => vec![Asset::ETHER],
        Some(raw) => raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<Asset>)
            .collect::<Result<Vec<_>, _>>()?,
    };

    let balances = state
        .node
        .read(|chain| {
            assets
                .iter()
                .map(|asset| {
                    chain
                        .balance_of(&ledger, *asset, &account)
                        .map(|amount| BalanceDto {
                            asset: *asset,
                            amount,
                        })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::node::NodeError::from)?;

    Ok(Json(BalancesResponse { account, balances }))
}

pub async fn post_order_status(
    Path(address): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<OrderStatusRequest>,
) -> Result<Json<OrderStatusResponse>, AppError> {
    let ledger = parse_address(&address)?;
    let dry_run = match (body.amount, body.taker) {
        (Some(amount), Some(taker)) => Some((amount, taker)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "amount and taker must be given together".into(),
            ))
        }
    };

    let order = body.order;
    let response = state
        .node
        .read(|chain| -> Result<OrderStatusResponse, crate::error::LedgerError> {
            Ok(OrderStatusResponse {
                order_hash: order.digest(ledger),
                signature_valid: order.verify(ledger),
                amount_filled: chain.amount_filled(&ledger, &order)?,
                available_volume: chain.available_volume(&ledger, &order)?,
                test_trade: dry_run
                    .map(|(amount, taker)| chain.test_trade(&ledger, &order, amount, &taker)),
            })
        })
        .await
        .map_err(crate::node::NodeError::from)?;

    Ok(Json(response))
}

mod optional_amount {
    use crate::domain::primitives::u256_dec;
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "u256_dec")] U256);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(v)| v))
    }
}
