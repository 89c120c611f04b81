//! Wire types for the HTTP API.
//!
//! Field names follow the legacy Spanish camelCase contract
//! (`numeroCuenta`, `saldoNuevo`, ...) so existing consumers keep working.

use chrono::{DateTime, Utc};
use engine::Money;
use serde::{Deserialize, Serialize};

pub mod cliente {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClienteCrear {
        pub nombre_completo: String,
        pub correo_electronico: String,
        pub numero_telefono: String,
        pub numero_documento: String,
        /// CC, CE, TI, ...
        pub tipo_documento: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClienteView {
        pub id_cliente: i64,
        pub nombre_completo: String,
        pub correo_electronico: String,
        pub numero_telefono: String,
        pub numero_documento: String,
        pub tipo_documento: String,
    }
}

pub mod cuenta {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TipoCuenta {
        Ahorro,
        Corriente,
        Credito,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum EstadoCuenta {
        Activa,
        Inactiva,
        Bloqueada,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CuentaCrear {
        pub id_cliente: i64,
        pub tipo_cuenta: TipoCuenta,
        pub saldo_inicial: Option<Money>,
        /// Only meaningful for credit accounts.
        pub limite_cuenta: Option<Money>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CuentaView {
        pub numero_cuenta: String,
        pub id_cliente: i64,
        pub tipo_cuenta: TipoCuenta,
        pub saldo_actual: Money,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub limite_cuenta: Option<Money>,
        pub estado_cuenta: EstadoCuenta,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EstadoCambiar {
        pub estado_cuenta: EstadoCuenta,
    }

    /// Query string for `GET /cuentas`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CuentasQuery {
        pub tipo: Option<String>,
        pub estado: Option<String>,
        pub incluir_inactivas: Option<bool>,
    }
}

pub mod transaccion {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TipoTransaccion {
        Consignacion,
        Retiro,
        Transferencia,
    }

    /// Body for `POST /transacciones/consignar` and `/retirar`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OperacionBancaria {
        pub numero_cuenta: String,
        pub monto: Money,
        pub descripcion: Option<String>,
    }

    /// Body for `POST /transacciones/transferir`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferenciaBancaria {
        pub numero_cuenta_origen: String,
        pub numero_cuenta_destino: String,
        pub monto: Money,
        pub descripcion: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransaccionView {
        pub id_transaccion: i64,
        pub numero_cuenta_origen: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub numero_cuenta_destino: Option<String>,
        pub tipo_transaccion: TipoTransaccion,
        pub monto_transaccion: Money,
        pub descripcion_transaccion: String,
        pub fecha_transaccion: DateTime<Utc>,
    }

    /// Response for deposits and withdrawals.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OperacionRespuesta {
        pub mensaje: String,
        pub transaccion: TransaccionView,
        pub saldo_anterior: Money,
        pub saldo_nuevo: Money,
    }

    /// Response for transfers: one snapshot per side.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferenciaRespuesta {
        pub mensaje: String,
        pub transaccion: TransaccionView,
        pub saldo_origen_anterior: Money,
        pub saldo_origen_nuevo: Money,
        pub saldo_destino_anterior: Money,
        pub saldo_destino_nuevo: Money,
    }

    /// Query string for `GET /transacciones`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransaccionesQuery {
        pub tipo: Option<String>,
        pub limite: Option<u64>,
    }
}
