//! Account endpoints.

use api_types::cuenta::{CuentaCrear, CuentaView, CuentasQuery, EstadoCambiar, EstadoCuenta, TipoCuenta};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Account, AccountFilter, AccountKind, AccountStatus, Money};
use serde::Serialize;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: TipoCuenta) -> AccountKind {
    match kind {
        TipoCuenta::Ahorro => AccountKind::Ahorro,
        TipoCuenta::Corriente => AccountKind::Corriente,
        TipoCuenta::Credito => AccountKind::Credito,
    }
}

fn view(account: Account) -> CuentaView {
    CuentaView {
        numero_cuenta: account.number,
        id_cliente: account.client_id,
        tipo_cuenta: match account.kind {
            AccountKind::Ahorro => TipoCuenta::Ahorro,
            AccountKind::Corriente => TipoCuenta::Corriente,
            AccountKind::Credito => TipoCuenta::Credito,
        },
        saldo_actual: account.balance,
        limite_cuenta: account.limit,
        estado_cuenta: match account.status {
            AccountStatus::Activa => EstadoCuenta::Activa,
            AccountStatus::Inactiva => EstadoCuenta::Inactiva,
            AccountStatus::Bloqueada => EstadoCuenta::Bloqueada,
        },
    }
}

#[derive(Serialize)]
pub struct Mensaje {
    mensaje: String,
}

pub async fn crear(
    State(state): State<ServerState>,
    Json(payload): Json<CuentaCrear>,
) -> Result<(StatusCode, Json<CuentaView>), ServerError> {
    let account = state
        .engine
        .create_account(
            payload.id_cliente,
            map_kind(payload.tipo_cuenta),
            payload.saldo_inicial.unwrap_or(Money::ZERO),
            payload.limite_cuenta,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(account))))
}

pub async fn listar(
    State(state): State<ServerState>,
    Query(query): Query<CuentasQuery>,
) -> Result<Json<Vec<CuentaView>>, ServerError> {
    let filter = AccountFilter {
        kind: query.tipo,
        status: query.estado,
        client_id: None,
        include_inactive: query.incluir_inactivas.unwrap_or(false),
    };
    let accounts = state.engine.accounts(&filter).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn obtener(
    State(state): State<ServerState>,
    Path(numero): Path<String>,
) -> Result<Json<CuentaView>, ServerError> {
    let account = state.engine.account(&numero).await?;
    Ok(Json(view(account)))
}

pub async fn por_cliente(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CuentaView>>, ServerError> {
    // 404 for an unknown client, not an empty list.
    state.engine.client(id).await?;

    let accounts = state.engine.accounts(&AccountFilter::by_client(id)).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn cambiar_estado(
    State(state): State<ServerState>,
    Path(numero): Path<String>,
    Json(payload): Json<EstadoCambiar>,
) -> Result<Json<CuentaView>, ServerError> {
    let status = match payload.estado_cuenta {
        EstadoCuenta::Activa => AccountStatus::Activa,
        EstadoCuenta::Inactiva => AccountStatus::Inactiva,
        EstadoCuenta::Bloqueada => AccountStatus::Bloqueada,
    };
    let account = state.engine.set_status(&numero, status).await?;
    Ok(Json(view(account)))
}

pub async fn eliminar(
    State(state): State<ServerState>,
    Path(numero): Path<String>,
) -> Result<Json<Mensaje>, ServerError> {
    state.engine.deactivate(&numero).await?;
    Ok(Json(Mensaje {
        mensaje: "Cuenta eliminada exitosamente".to_string(),
    }))
}
