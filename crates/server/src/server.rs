use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{clientes, cuentas, transacciones};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/clientes", post(clientes::crear).get(clientes::listar))
        .route("/clientes/{id}", get(clientes::obtener))
        .route("/clientes/{id}/cuentas", get(cuentas::por_cliente))
        .route("/cuentas", post(cuentas::crear).get(cuentas::listar))
        .route(
            "/cuentas/{numero}",
            get(cuentas::obtener).delete(cuentas::eliminar),
        )
        .route("/cuentas/{numero}/estado", put(cuentas::cambiar_estado))
        .route(
            "/cuentas/{numero}/transacciones",
            get(transacciones::por_cuenta),
        )
        .route("/transacciones", get(transacciones::listar))
        .route("/transacciones/{id}", get(transacciones::obtener))
        .route("/transacciones/consignar", post(transacciones::consignar))
        .route("/transacciones/retirar", post(transacciones::retirar))
        .route("/transacciones/transferir", post(transacciones::transferir))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use engine::LedgerStore;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .store(LedgerStore::sql(db))
            .build()
            .await
            .unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    async fn request(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_account(router: &Router, saldo_inicial: f64) -> String {
        let (status, cliente) = request(
            router,
            Method::POST,
            "/clientes",
            Some(json!({
                "nombreCompleto": "Juan Pérez García",
                "correoElectronico": "juan.perez@email.com",
                "numeroTelefono": "+57 300 123 4567",
                "numeroDocumento": "12345678",
                "tipoDocumento": "CC",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, cuenta) = request(
            router,
            Method::POST,
            "/cuentas",
            Some(json!({
                "idCliente": cliente["idCliente"],
                "tipoCuenta": "ahorro",
                "saldoInicial": saldo_inicial,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        cuenta["numeroCuenta"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn consignar_returns_balance_snapshots() {
        let router = test_router().await;
        let numero = open_account(&router, 1000.0).await;

        let (status, body) = request(
            &router,
            Method::POST,
            "/transacciones/consignar",
            Some(json!({
                "numeroCuenta": numero,
                "monto": 500.00,
                "descripcion": "Consignación por nómina",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["mensaje"], "Consignación exitosa");
        assert_eq!(body["saldoAnterior"], json!(1000.0));
        assert_eq!(body["saldoNuevo"], json!(1500.0));
        assert_eq!(body["transaccion"]["tipoTransaccion"], "consignacion");
        assert_eq!(
            body["transaccion"]["descripcionTransaccion"],
            "Consignación por nómina"
        );
    }

    #[tokio::test]
    async fn retirar_rejects_insufficient_funds() {
        let router = test_router().await;
        let numero = open_account(&router, 1000.0).await;

        let (status, body) = request(
            &router,
            Method::POST,
            "/transacciones/retirar",
            Some(json!({ "numeroCuenta": numero, "monto": 1500.00 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("saldo insuficiente"));

        // Balance untouched, nothing recorded.
        let (_, cuenta) = request(&router, Method::GET, &format!("/cuentas/{numero}"), None).await;
        assert_eq!(cuenta["saldoActual"], json!(1000.0));
        let (_, historial) = request(
            &router,
            Method::GET,
            &format!("/cuentas/{numero}/transacciones"),
            None,
        )
        .await;
        assert_eq!(historial, json!([]));
    }

    #[tokio::test]
    async fn transferir_reports_both_sides() {
        let router = test_router().await;
        let origen = open_account(&router, 1000.0).await;
        let destino = open_account(&router, 200.0).await;

        let (status, body) = request(
            &router,
            Method::POST,
            "/transacciones/transferir",
            Some(json!({
                "numeroCuentaOrigen": origen,
                "numeroCuentaDestino": destino,
                "monto": 300.00,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["saldoOrigenAnterior"], json!(1000.0));
        assert_eq!(body["saldoOrigenNuevo"], json!(700.0));
        assert_eq!(body["saldoDestinoAnterior"], json!(200.0));
        assert_eq!(body["saldoDestinoNuevo"], json!(500.0));
        assert_eq!(body["transaccion"]["numeroCuentaDestino"], destino);
    }

    #[tokio::test]
    async fn transferir_validates_accounts_and_amounts() {
        let router = test_router().await;
        let origen = open_account(&router, 1000.0).await;

        let (status, _) = request(
            &router,
            Method::POST,
            "/transacciones/transferir",
            Some(json!({
                "numeroCuentaOrigen": origen,
                "numeroCuentaDestino": "1000000000",
                "monto": 10.00,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = request(
            &router,
            Method::POST,
            "/transacciones/transferir",
            Some(json!({
                "numeroCuentaOrigen": origen,
                "numeroCuentaDestino": origen,
                "monto": 10.00,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = request(
            &router,
            Method::POST,
            "/transacciones/consignar",
            Some(json!({ "numeroCuenta": origen, "monto": -50.00 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn eliminar_soft_deletes_zero_balance_accounts() {
        let router = test_router().await;
        let numero = open_account(&router, 100.0).await;

        let (status, _) =
            request(&router, Method::DELETE, &format!("/cuentas/{numero}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        request(
            &router,
            Method::POST,
            "/transacciones/retirar",
            Some(json!({ "numeroCuenta": numero, "monto": 100.00 })),
        )
        .await;
        let (status, body) =
            request(&router, Method::DELETE, &format!("/cuentas/{numero}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensaje"], "Cuenta eliminada exitosamente");

        // Soft deleted: hidden from the default listing, still resolvable.
        let (_, cuentas) = request(&router, Method::GET, "/cuentas", None).await;
        assert_eq!(cuentas, json!([]));
        let (status, cuenta) =
            request(&router, Method::GET, &format!("/cuentas/{numero}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cuenta["estadoCuenta"], "inactiva");
    }

    #[tokio::test]
    async fn transacciones_filter_by_tipo_is_accent_insensitive() {
        let router = test_router().await;
        let numero = open_account(&router, 1000.0).await;

        request(
            &router,
            Method::POST,
            "/transacciones/consignar",
            Some(json!({ "numeroCuenta": numero, "monto": 10.00 })),
        )
        .await;
        request(
            &router,
            Method::POST,
            "/transacciones/retirar",
            Some(json!({ "numeroCuenta": numero, "monto": 5.00 })),
        )
        .await;

        let (status, body) = request(
            &router,
            Method::GET,
            "/transacciones?tipo=Consignaci%C3%B3n",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["tipoTransaccion"], "consignacion");
    }
}
