//! Client directory endpoints.

use api_types::cliente::{ClienteCrear, ClienteView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Client, NewClient};

use crate::{ServerError, server::ServerState};

fn view(client: Client) -> ClienteView {
    ClienteView {
        id_cliente: client.id,
        nombre_completo: client.full_name,
        correo_electronico: client.email,
        numero_telefono: client.phone,
        numero_documento: client.document_number,
        tipo_documento: client.document_kind,
    }
}

pub async fn crear(
    State(state): State<ServerState>,
    Json(payload): Json<ClienteCrear>,
) -> Result<(StatusCode, Json<ClienteView>), ServerError> {
    let client = state
        .engine
        .create_client(NewClient {
            full_name: payload.nombre_completo,
            email: payload.correo_electronico,
            phone: payload.numero_telefono,
            document_number: payload.numero_documento,
            document_kind: payload.tipo_documento,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(client))))
}

pub async fn listar(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ClienteView>>, ServerError> {
    let clients = state.engine.clients().await?;
    Ok(Json(clients.into_iter().map(view).collect()))
}

pub async fn obtener(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ClienteView>, ServerError> {
    let client = state.engine.client(id).await?;
    Ok(Json(view(client)))
}
