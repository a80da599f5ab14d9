//! Demo handler - projection の各規則を一通り通るサンプルアプリ

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use spark_core::{Describe, MethodSet, RequestContext, Rules, Service, UnixTime, Validate};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("error: {0}")]
    Requested(String),
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
#[serde(default)]
pub struct EchoRequest {
    pub message: String,
}

impl Validate for EchoRequest {
    fn rules(rules: &mut Rules<'_, Self>) {
        rules.field("message", |r| &r.message).required();
    }
}

#[derive(Debug, Serialize, Deserialize, Describe)]
pub struct EchoResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
pub struct TimeResponse {
    #[serde(rename = "Time")]
    pub time: UnixTime,
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct ExtendedField {
    #[serde(rename = "Test")]
    pub test: String,
    pub iamfloating: f32,
    #[serde(rename = "Banana")]
    pub banana: bool,
    #[serde(rename = "Flotarr")]
    pub flotarr: Vec<f32>,
    #[serde(rename = "Bytes", with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct TestStruct {
    #[serde(rename = "Test")]
    pub test: String,
    pub iamfloating: f32,
}

/// App はデモ用の HandlerObject
#[derive(Debug, Default)]
pub struct App;

impl App {
    async fn example(
        self: Arc<Self>,
        _ctx: RequestContext,
        req: EchoRequest,
    ) -> Result<EchoResponse, AppError> {
        Ok(EchoResponse {
            message: format!("echo: {}", req.message),
        })
    }

    async fn example_plain(
        self: Arc<Self>,
        _ctx: RequestContext,
        req: EchoRequest,
    ) -> Result<String, AppError> {
        Ok(format!("echo: {}", req.message))
    }

    async fn fail_for_me(
        self: Arc<Self>,
        _ctx: RequestContext,
        req: EchoRequest,
    ) -> Result<String, AppError> {
        Err(AppError::Requested(req.message))
    }

    async fn binary_example(self: Arc<Self>, _ctx: RequestContext) -> Result<Bytes, AppError> {
        Ok(Bytes::from_static(&[0x1, 0x2]))
    }

    async fn native_type_example(
        self: Arc<Self>,
        _ctx: RequestContext,
        values: Vec<f32>,
    ) -> Result<f64, AppError> {
        for value in &values {
            debug!(value, "native value");
        }
        Ok(0.4444)
    }

    async fn get_time(self: Arc<Self>, _ctx: RequestContext) -> Result<TimeResponse, AppError> {
        Ok(TimeResponse {
            time: UnixTime::now(),
        })
    }

    async fn rand_bytes(self: Arc<Self>, _ctx: RequestContext) -> Result<ByteBuf, AppError> {
        let buf: [u8; 16] = rand::random();
        Ok(ByteBuf::from(buf.to_vec()))
    }

    async fn type_handling(self: Arc<Self>, _ctx: RequestContext) -> Result<ExtendedField, AppError> {
        Ok(ExtendedField::default())
    }

    async fn type_handling2(self: Arc<Self>, _ctx: RequestContext) -> Result<TestStruct, AppError> {
        Ok(TestStruct::default())
    }
}

impl Service for App {
    const NAME: &'static str = "App";

    fn methods(set: &mut MethodSet<Self>) {
        set.method("Example", App::example)
            .method("ExamplePlain", App::example_plain)
            .method("FailForMe", App::fail_for_me)
            .method("BinaryExample", App::binary_example)
            .method("NativeTypeExample", App::native_type_example)
            .method("GetTime", App::get_time)
            .method("RandBytes", App::rand_bytes)
            .method("TypeHandling", App::type_handling)
            .method("TypeHandling2", App::type_handling2);
    }
}

/// 起動時に必ず公開されるべきメソッド
pub const EXPECTED_METHODS: &[&str] = &[
    "Example",
    "ExamplePlain",
    "FailForMe",
    "BinaryExample",
    "NativeTypeExample",
    "GetTime",
    "RandBytes",
    "TypeHandling",
    "TypeHandling2",
];
