//! Ledger operation and transaction-history endpoints.

use api_types::transaccion::{
    OperacionBancaria, OperacionRespuesta, TipoTransaccion, TransaccionView, TransaccionesQuery,
    TransferenciaBancaria, TransferenciaRespuesta,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{OperationReceipt, Transaction, TransactionFilter, TransactionKind};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: TransactionKind) -> TipoTransaccion {
    match kind {
        TransactionKind::Consignacion => TipoTransaccion::Consignacion,
        TransactionKind::Retiro => TipoTransaccion::Retiro,
        TransactionKind::Transferencia => TipoTransaccion::Transferencia,
    }
}

fn view(tx: Transaction) -> TransaccionView {
    TransaccionView {
        id_transaccion: tx.id,
        numero_cuenta_origen: tx.source_account,
        numero_cuenta_destino: tx.destination_account,
        tipo_transaccion: map_kind(tx.kind),
        monto_transaccion: tx.amount,
        descripcion_transaccion: tx.description,
        fecha_transaccion: tx.created_at,
    }
}

fn operacion_respuesta(mensaje: &str, receipt: OperationReceipt) -> OperacionRespuesta {
    let change = &receipt.changes[0];
    OperacionRespuesta {
        mensaje: mensaje.to_string(),
        saldo_anterior: change.previous,
        saldo_nuevo: change.current,
        transaccion: view(receipt.transaction),
    }
}

pub async fn consignar(
    State(state): State<ServerState>,
    Json(payload): Json<OperacionBancaria>,
) -> Result<(StatusCode, Json<OperacionRespuesta>), ServerError> {
    let receipt = state
        .engine
        .deposit(&payload.numero_cuenta, payload.monto, payload.descripcion)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(operacion_respuesta("Consignación exitosa", receipt)),
    ))
}

pub async fn retirar(
    State(state): State<ServerState>,
    Json(payload): Json<OperacionBancaria>,
) -> Result<(StatusCode, Json<OperacionRespuesta>), ServerError> {
    let receipt = state
        .engine
        .withdraw(&payload.numero_cuenta, payload.monto, payload.descripcion)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(operacion_respuesta("Retiro exitoso", receipt)),
    ))
}

pub async fn transferir(
    State(state): State<ServerState>,
    Json(payload): Json<TransferenciaBancaria>,
) -> Result<(StatusCode, Json<TransferenciaRespuesta>), ServerError> {
    let receipt = state
        .engine
        .transfer(
            &payload.numero_cuenta_origen,
            &payload.numero_cuenta_destino,
            payload.monto,
            payload.descripcion,
        )
        .await?;

    let origen = &receipt.changes[0];
    let destino = &receipt.changes[1];
    let respuesta = TransferenciaRespuesta {
        mensaje: "Transferencia exitosa".to_string(),
        saldo_origen_anterior: origen.previous,
        saldo_origen_nuevo: origen.current,
        saldo_destino_anterior: destino.previous,
        saldo_destino_nuevo: destino.current,
        transaccion: view(receipt.transaction),
    };
    Ok((StatusCode::CREATED, Json(respuesta)))
}

pub async fn listar(
    State(state): State<ServerState>,
    Query(query): Query<TransaccionesQuery>,
) -> Result<Json<Vec<TransaccionView>>, ServerError> {
    let kind = match &query.tipo {
        // An unrecognized filter value matches nothing.
        Some(tipo) => match TransactionKind::from_filter(tipo) {
            Some(kind) => Some(kind),
            None => return Ok(Json(Vec::new())),
        },
        None => None,
    };

    let filter = TransactionFilter {
        kind,
        limit: query.limite,
        ..TransactionFilter::default()
    };
    let transactions = state.engine.transactions(&filter).await?;
    Ok(Json(transactions.into_iter().map(view).collect()))
}

pub async fn obtener(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransaccionView>, ServerError> {
    let tx = state.engine.transaction(id).await?;
    Ok(Json(view(tx)))
}

pub async fn por_cuenta(
    State(state): State<ServerState>,
    Path(numero): Path<String>,
) -> Result<Json<Vec<TransaccionView>>, ServerError> {
    // 404 for an unknown account, not an empty list.
    state.engine.account(&numero).await?;

    let transactions = state
        .engine
        .transactions(&TransactionFilter::by_account(numero))
        .await?;
    Ok(Json(transactions.into_iter().map(view).collect()))
}
