//! MemoryRoutes と axum::Router を通した bind / dispatch の通し試験

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use ciborium::Value;
use serde::{Deserialize, Serialize};
use spark_core::app::{Projector, ProjectorConfig};
use spark_core::domain::{Signature, TypeDescriptor};
use spark_core::impls::MemoryRoutes;
use spark_core::typed::{Describe, DynMethod, PayloadCodec};
use spark_core::{MethodSet, Reply, RequestContext, RpcApp, Rules, Service, Validate};
use tokio::sync::mpsc;
use tower::ServiceExt;

// ========================================
// handler object
// ========================================

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Describe)]
#[serde(default)]
struct Message {
    #[serde(rename = "Message")]
    message: String,
}

impl Validate for Message {
    fn rules(rules: &mut Rules<'_, Self>) {
        rules.field("Message", |m| &m.message).required();
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Describe)]
struct Blob {
    data: Vec<u8>,
    nested: Vec<Vec<u8>>,
    inner: Option<Inner>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Describe)]
struct Inner {
    raw: Box<Vec<u8>>,
}

/// 宣言順・rename とも serde のマップと一致すること
#[derive(Debug, PartialEq, Serialize, Deserialize, Describe)]
struct Renamed {
    #[serde(rename = "msg")]
    message: String,
    data: Vec<u8>,
}

#[derive(Default)]
struct Echoer {
    calls: AtomicUsize,
}

impl Echoer {
    async fn echo(self: Arc<Self>, _ctx: RequestContext, req: Message) -> Result<Message, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Message {
            message: format!("echo: {}", req.message),
        })
    }

    async fn fail(self: Arc<Self>, _ctx: RequestContext, req: Message) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(format!("error: {}", req.message))
    }

    async fn blob(self: Arc<Self>, _ctx: RequestContext) -> Result<Blob, String> {
        Ok(sample_blob())
    }

    async fn renamed(self: Arc<Self>, _ctx: RequestContext) -> Result<Renamed, String> {
        Ok(Renamed {
            message: "hi".to_string(),
            data: vec![1, 2],
        })
    }
}

fn sample_blob() -> Blob {
    Blob {
        data: vec![1, 2],
        nested: vec![vec![3], vec![]],
        inner: Some(Inner {
            raw: Box::new(vec![4, 5]),
        }),
    }
}

/// 不合格になる想定のエントリ用（呼び出し口は何でもよい）
fn placeholder_invoker() -> Arc<dyn DynMethod<Echoer>> {
    let mut set = MethodSet::<Echoer>::new();
    set.method("Blob", Echoer::blob);
    set.into_entries().remove(0).invoker
}

impl Service for Echoer {
    const NAME: &'static str = "Echoer";

    fn methods(set: &mut MethodSet<Self>) {
        set.method("Echo", Echoer::echo)
            .method("Fail", Echoer::fail)
            .method("Blob", Echoer::blob)
            .method("Renamed", Echoer::renamed);

        // (ctx) -> (Receiver<i32>, error)
        let stream = Signature::new()
            .receiver()
            .context()
            .returns(<mpsc::Receiver<i32>>::descriptor())
            .fails();
        set.raw("Subscribe", stream, placeholder_invoker());

        // receiver only, no context
        set.raw(
            "Helper",
            Signature::new().receiver().returns(String::descriptor()).fails(),
            placeholder_invoker(),
        );
    }
}

fn app() -> (Arc<Echoer>, RpcApp<Echoer>) {
    let handler = Arc::new(Echoer::default());
    let app = RpcApp::builder(handler.clone())
        .expect_methods(&["Echo", "Fail", "Blob"])
        .build()
        .unwrap();
    (handler, app)
}

fn memory_routes(app: &RpcApp<Echoer>) -> MemoryRoutes {
    let mut routes = MemoryRoutes::new();
    app.attach(&mut routes);
    routes
}

fn encode_message(text: &str) -> Bytes {
    PayloadCodec::encode(&Message {
        message: text.to_string(),
    })
    .unwrap()
}

// ========================================
// scenarios
// ========================================

#[tokio::test]
async fn scenario_a_echo_round_trips_over_http() {
    let (_, app) = app();
    assert!(app.bindings()[0].has_argument);

    let response = app
        .router()
        .oneshot(
            Request::post("/rpc/Echo")
                .header("content-type", "application/cbor")
                .body(Body::from(encode_message("hi")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/cbor");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let reply: Message = PayloadCodec::decode(&body).unwrap();
    assert_eq!(reply.message, "echo: hi");
}

#[tokio::test]
async fn scenario_b_handler_error_is_a_flagged_400() {
    let (_, app) = app();

    let response = app
        .router()
        .oneshot(
            Request::post("/rpc/Fail")
                .body(Body::from(encode_message("x")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["rpc-failed"], "1");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, Bytes::from_static(b"error: x"));
}

#[tokio::test]
async fn scenario_c_missing_required_field_never_reaches_handler() {
    #[derive(Serialize)]
    struct Empty {}

    let (handler, app) = app();
    let routes = memory_routes(&app);
    let body = PayloadCodec::encode(&Empty {}).unwrap();

    let reply = routes
        .call("/rpc/Echo", RequestContext::new(), body)
        .await
        .unwrap();

    assert_eq!(reply, Reply::failure("Message is a required field"));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scenario_d_stream_result_is_not_bound() {
    let (_, app) = app();
    let routes = memory_routes(&app);

    assert!(app.bindings().iter().all(|b| b.name != "Subscribe"));
    assert!(app.skipped().contains(&"Subscribe".to_string()));
    assert!(!routes.contains("/rpc/Subscribe"));
    assert!(!app.typedefs().contains("Subscribe"));
}

// ========================================
// properties
// ========================================

#[test]
fn rejected_methods_are_absent_and_binding_completes() {
    let (_, app) = app();
    let names: Vec<_> = app.bindings().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Echo", "Fail", "Blob", "Renamed"]);
    assert_eq!(app.skipped(), ["Subscribe".to_string(), "Helper".to_string()]);
}

#[test]
fn has_argument_matches_parameter_count() {
    let (_, app) = app();
    for binding in app.bindings() {
        assert_eq!(binding.has_argument, binding.argument.is_some());
    }
    assert!(!app.bindings()[2].has_argument);
}

async fn call_over_http(app: &RpcApp<Echoer>, path: &str) -> Bytes {
    let response = app
        .router()
        .oneshot(Request::post(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

fn map_entry<'v>(value: &'v Value, key: &str) -> &'v Value {
    value
        .as_map()
        .and_then(|entries| entries.iter().find(|(k, _)| k.as_text() == Some(key)))
        .map(|(_, v)| v)
        .unwrap()
}

#[tokio::test]
async fn byte_sequences_project_to_binary_at_any_depth() {
    let (_, app) = app();
    let typedefs = app.typedefs();
    assert!(typedefs.contains("\t\"data\": Uint8Array;\n"));
    assert!(typedefs.contains("\t\"nested\": Uint8Array[];\n"));
    assert!(typedefs.contains("\t\"raw\": Uint8Array;\n"));
    assert!(!typedefs.contains("number /* u8 */"));

    // ワイヤ上も byte string で届く
    let body = call_over_http(&app, "/rpc/Blob").await;
    let value: Value = PayloadCodec::decode(&body).unwrap();
    assert_eq!(map_entry(&value, "data"), &Value::Bytes(vec![1, 2]));
    assert_eq!(
        map_entry(&value, "nested"),
        &Value::Array(vec![Value::Bytes(vec![3]), Value::Bytes(vec![])])
    );
    assert_eq!(
        map_entry(map_entry(&value, "inner"), "raw"),
        &Value::Bytes(vec![4, 5])
    );

    let blob: Blob = PayloadCodec::decode(&body).unwrap();
    assert_eq!(blob, sample_blob());
}

#[tokio::test]
async fn renamed_field_appears_under_its_wire_name_in_wire_order() {
    let (_, app) = app();
    assert!(app.typedefs().contains(
        "export interface Renamed {\n\t\"msg\": string;\n\t\"data\": Uint8Array;\n}\n"
    ));

    let body = call_over_http(&app, "/rpc/Renamed").await;
    let value: Value = PayloadCodec::decode(&body).unwrap();
    let keys: Vec<_> = value
        .as_map()
        .unwrap()
        .iter()
        .filter_map(|(k, _)| k.as_text())
        .collect();
    assert_eq!(keys, vec!["msg", "data"]);
    assert_eq!(map_entry(&value, "data"), &Value::Bytes(vec![1, 2]));
}

#[test]
fn projection_is_idempotent_and_structs_are_declared_once() {
    let mut projector = Projector::new(ProjectorConfig::default());
    let ty: TypeDescriptor = Message::descriptor();
    assert_eq!(projector.project(&ty), projector.project(&ty));

    let (_, app) = app();
    assert_eq!(
        app.typedefs().matches("export interface Message {").count(),
        1
    );
}

#[tokio::test]
async fn validation_failure_response_lists_the_field_over_http() {
    let (handler, app) = app();

    let response = app
        .router()
        .oneshot(
            Request::post("/rpc/Fail")
                .body(Body::from(encode_message("")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, Bytes::from_static(b"Message is a required field"));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn truncated_payload_is_a_failure_not_a_crash() {
    let (_, app) = app();
    let routes = memory_routes(&app);
    let full = encode_message("hello");

    let reply = routes
        .call("/rpc/Echo", RequestContext::new(), full.slice(..full.len() - 2))
        .await
        .unwrap();

    let Reply::Failure(message) = reply else {
        panic!("expected failure");
    };
    assert!(message.starts_with("failed to decode argument"));
}
