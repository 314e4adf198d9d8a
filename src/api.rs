use crate::{
    pico_client::{PeerDeviceClient, PollResult},
    services::hydraulics::ConfigurationStore,
};
use actix_web::{
    HttpResponse, Responder,
    http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    },
    middleware::DefaultHeaders,
    web,
};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct IndexResponse {
    status: &'static str,
    message: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
}

/// Body returned by `/config` when the configuration cannot be produced
#[derive(Serialize)]
pub struct ConfigErrorResponse {
    error: String,
    details: String,
}

/// CORS headers stamped on every response, 404s included
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .add((ACCESS_CONTROL_ALLOW_METHODS, "GET"))
}

#[derive(Clone)]
pub struct Api<PeerClient>
where
    PeerClient: PeerDeviceClient,
{
    pub peer_client: PeerClient,
    pub store: ConfigurationStore,
}

impl<PeerClient> Api<PeerClient>
where
    PeerClient: PeerDeviceClient,
{
    pub fn new(peer_client: PeerClient, store: ConfigurationStore) -> Self {
        Api { peer_client, store }
    }

    pub async fn index() -> impl Responder {
        debug!("index() called");

        HttpResponse::Ok().json(IndexResponse {
            status: "ok",
            message: "relay server is running",
            endpoints: BTreeMap::from([
                ("/api/nfc", "Get NFC status"),
                ("/config", "Get configuration"),
            ]),
        })
    }

    pub async fn nfc_status(api: web::Data<Self>) -> impl Responder {
        debug!("nfc_status() called");

        match api.peer_client.nfc_status().await {
            Ok(result) => {
                info!("returning nfc status: {result:?}");
                HttpResponse::Ok().json(result)
            }
            Err(e) => {
                error!("nfc_status failed: {e:#}");
                HttpResponse::InternalServerError().json(PollResult::failed(format!(
                    "Fout bij ophalen NFC status: {e:#}"
                )))
            }
        }
    }

    /// Answers 200 with an `error`/`details` body when the configuration cannot be produced.
    pub async fn config(api: web::Data<Self>) -> impl Responder {
        debug!("config() called");

        match api.store.configuration() {
            Ok(configuration) => HttpResponse::Ok().json(configuration),
            Err(e) => {
                error!("config failed: {e:#}");
                HttpResponse::Ok().json(ConfigErrorResponse {
                    error: e.to_string(),
                    details: format!("{e:#}"),
                })
            }
        }
    }

    pub async fn version() -> impl Responder {
        HttpResponse::Ok().body(env!("CARGO_PKG_VERSION"))
    }
}
