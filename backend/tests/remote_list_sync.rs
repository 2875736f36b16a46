//! End-to-end coverage of the remote sync strategy against a fake
//! Persistence Service served by actix-web on an ephemeral port.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

use shared_lists::config::SharedListsSettings;
use shared_lists::domain::{
    BearerToken, ErrorCode, ItemDraft, ListId, ListPhase, Session, UserId,
};
use shared_lists::wiring::{Services, build_services};

const TOKEN: &str = "secret-token";

/// Mongo-shaped documents held by the fake service.
#[derive(Default)]
struct FakeStore {
    lists: Vec<Value>,
    users: Vec<Value>,
    created: u64,
    clock: u64,
}

impl FakeStore {
    /// Next `updatedAt` stamp, one second after the previous write.
    fn tick(&mut self) -> Value {
        self.clock += 1;
        stamp(self.clock)
    }
}

fn stamp(seconds: u64) -> Value {
    json!(format!(
        "2024-01-03T10:{:02}:{:02}.000Z",
        seconds / 60,
        seconds % 60
    ))
}

type Shared = web::Data<Arc<Mutex<FakeStore>>>;

fn authorised(req: &HttpRequest) -> bool {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn position(store: &FakeStore, id: &str) -> Option<usize> {
    store.lists.iter().position(|doc| doc["_id"] == id)
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Shopping list not found" }))
}

async fn list_all(req: HttpRequest, state: Shared) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().json(json!({ "message": "Unauthorized" }));
    }
    let store = state.lock().expect("fake store lock");
    HttpResponse::Ok().json(json!({ "status": "success", "data": store.lists }))
}

async fn create(req: HttpRequest, state: Shared, body: web::Json<Value>) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let mut store = state.lock().expect("fake store lock");
    store.created += 1;
    let id = format!("m{}", store.created);
    let owner = body["ownerId"].clone();
    let now = store.tick();
    store.lists.push(json!({
        "_id": id,
        "title": body["title"],
        "ownerId": owner,
        "memberIds": [owner],
        "items": [],
        "archived": false,
        "createdAt": now,
        "updatedAt": now,
        "__v": 0
    }));
    HttpResponse::Created().json(json!({ "status": "success", "message": "Shopping list created" }))
}

async fn get_one(req: HttpRequest, state: Shared, id: web::Path<String>) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let store = state.lock().expect("fake store lock");
    match position(&store, &id) {
        Some(index) => HttpResponse::Ok().json(&store.lists[index]),
        None => not_found(),
    }
}

async fn update(
    req: HttpRequest,
    state: Shared,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let mut store = state.lock().expect("fake store lock");
    let Some(index) = position(&store, &id) else {
        return not_found();
    };
    // `findOneAndUpdate` with `$set`: If-Match is ignored, `__v` is left
    // alone and only the timestamp moves.
    let now = store.tick();
    let doc = &mut store.lists[index];
    for key in ["title", "archived", "items", "memberIds"] {
        if let Some(value) = body.get(key) {
            doc[key] = value.clone();
        }
    }
    doc["updatedAt"] = now;
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Shopping list updated",
        "data": doc
    }))
}

async fn delete(req: HttpRequest, state: Shared, id: web::Path<String>) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let mut store = state.lock().expect("fake store lock");
    match position(&store, &id) {
        Some(index) => {
            store.lists.remove(index);
            HttpResponse::Ok().json(json!({ "status": "success", "message": "Shopping list deleted" }))
        }
        None => not_found(),
    }
}

async fn users(req: HttpRequest, state: Shared) -> HttpResponse {
    if !authorised(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let store = state.lock().expect("fake store lock");
    HttpResponse::Ok().json(&store.users)
}

fn seeded_store() -> FakeStore {
    FakeStore {
        lists: vec![
            json!({
                "_id": "l1",
                "title": "Groceries",
                "ownerId": "u1",
                "memberIds": ["u1", "u2"],
                "items": [
                    { "_id": "i1", "name": "Milk", "quantity": 1, "unit": "l", "resolved": false }
                ],
                "archived": false,
                "createdAt": "2024-01-03T10:00:00.000Z",
                "updatedAt": "2024-01-03T10:00:00.000Z",
                "__v": 0
            }),
            json!({
                "_id": "l2",
                "title": "Birthday party",
                "ownerId": "u2",
                "memberIds": ["u2"],
                "items": [],
                "createdAt": "2024-01-03T10:00:00.000Z",
                "updatedAt": "2024-01-03T10:00:00.000Z",
                "__v": 0
            }),
        ],
        users: vec![
            json!({ "_id": "u1", "name": "Alice", "email": "alice@example.com", "password": "$2b$10$x" }),
            json!({ "_id": "u2", "name": "Bob", "email": "bob@example.com", "password": "$2b$10$y" }),
            json!({ "_id": "u3", "name": "Carla", "email": "carla@example.com", "password": "$2b$10$z" }),
        ],
        created: 0,
        clock: 0,
    }
}

struct Harness {
    state: Arc<Mutex<FakeStore>>,
    services: Services,
    handle: ServerHandle,
}

impl Harness {
    async fn start(optimistic_concurrency: bool) -> Self {
        let state = Arc::new(Mutex::new(seeded_store()));
        let data = web::Data::new(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::scope("/shoppingList")
                    .route("/list", web::get().to(list_all))
                    .route("/create", web::post().to(create))
                    .route("/get/{id}", web::get().to(get_one))
                    .route("/update/{id}", web::patch().to(update))
                    .route("/delete/{id}", web::delete().to(delete)),
            )
            .route("/user/list", web::get().to(users))
        })
        .workers(1)
        .listen(listener)
        .expect("listen")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let settings = SharedListsSettings {
            sync_mode: Some("remote".to_owned()),
            persistence_url: Some(format!("http://{addr}/")),
            request_timeout_ms: 5000,
            mock_latency_ms: 0,
            mock_seed_path: None,
            optimistic_concurrency,
            locale: None,
        };
        let services = build_services(&settings).expect("remote wiring");
        Self {
            state,
            services,
            handle,
        }
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn session(user: &str) -> Session {
    Session::new(UserId::new(user).expect("valid user id"))
        .with_credential(BearerToken::new(TOKEN).expect("non-empty token"))
}

fn list_id(raw: &str) -> ListId {
    ListId::new(raw).expect("valid list id")
}

#[actix_rt::test]
async fn item_edits_commit_the_service_entity() {
    let harness = Harness::start(false).await;
    let alice = session("u1");
    harness.services.store.load(&alice).await.expect("load");
    let before = harness
        .services
        .store
        .get_list_by_id(&list_id("l1"))
        .expect("loaded");

    let updated = harness
        .services
        .editor
        .add_item(&alice, &list_id("l1"), &ItemDraft::new("Eggs", 12.0, Some("pc")))
        .await
        .expect("item added");

    assert_eq!(updated.revision(), before.revision() + 1000);
    assert_eq!(updated.items().len(), 2);
    assert_eq!(
        harness.services.store.get_list_by_id(&list_id("l1")),
        Ok(updated)
    );
    assert_eq!(
        harness.services.store.phase(&list_id("l1")),
        ListPhase::Committed
    );
    let state = harness.state.lock().expect("lock");
    assert_eq!(state.lists[0]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(state.lists[0]["__v"], json!(0));
    drop(state);
    harness.stop().await;
}

#[actix_rt::test]
async fn create_recovers_entity_from_listing() {
    let harness = Harness::start(false).await;
    let bob = session("u2");
    harness.services.store.load(&bob).await.expect("load");

    let created = harness
        .services
        .store
        .create_list(&bob, "Hardware")
        .await
        .expect("created");

    assert_eq!(created.id().as_ref(), "m1");
    assert_eq!(created.owner_id().as_ref(), "u2");
    assert!(
        harness
            .services
            .store
            .get_lists_by_user(&UserId::new("u2").expect("valid user id"), false)
            .iter()
            .any(|list| list.id() == created.id())
    );
    harness.stop().await;
}

#[actix_rt::test]
async fn missing_credential_fails_before_sending() {
    let harness = Harness::start(false).await;
    let anonymous = Session::new(UserId::new("u1").expect("valid user id"));

    let err = harness
        .services
        .store
        .load(&anonymous)
        .await
        .expect_err("no credential");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    harness.stop().await;
}

#[actix_rt::test]
async fn remotely_deleted_list_is_evicted_on_write() {
    let harness = Harness::start(false).await;
    let alice = session("u1");
    harness.services.store.load(&alice).await.expect("load");
    harness.state.lock().expect("lock").lists.remove(0);

    let err = harness
        .services
        .store
        .archive_list(&alice, &list_id("l1"))
        .await
        .expect_err("gone remotely");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(harness.services.store.get_list_by_id(&list_id("l1")).is_err());
    harness.stop().await;
}

#[actix_rt::test]
async fn stale_revision_is_rejected_when_checked() {
    let harness = Harness::start(true).await;
    let alice = session("u1");
    harness.services.store.load(&alice).await.expect("load");
    // Another client writes in between; `$set` leaves `__v` at 0.
    harness.state.lock().expect("lock").lists[0]["updatedAt"] = stamp(30);

    let err = harness
        .services
        .editor
        .rename_list(&alice, &list_id("l1"), "Weekly shop")
        .await
        .expect_err("stale revision");

    assert_eq!(err.code(), ErrorCode::Conflict);
    let local = harness
        .services
        .store
        .get_list_by_id(&list_id("l1"))
        .expect("still cached");
    assert_eq!(local.title().as_ref(), "Groceries");
    assert_eq!(
        harness.services.store.phase(&list_id("l1")),
        ListPhase::Committed
    );
    harness.stop().await;
}

#[actix_rt::test]
async fn checked_writes_follow_the_service_stamp() {
    let harness = Harness::start(true).await;
    let alice = session("u1");
    harness.services.store.load(&alice).await.expect("load");

    let renamed = harness
        .services
        .editor
        .rename_list(&alice, &list_id("l1"), "Weekly shop")
        .await
        .expect("first checked write");
    let archived = harness
        .services
        .store
        .archive_list(&alice, &list_id("l1"))
        .await
        .expect("second checked write uses the committed stamp");

    assert!(archived.revision() > renamed.revision());
    assert!(archived.is_archived());
    assert_eq!(archived.title().as_ref(), "Weekly shop");
    harness.stop().await;
}

#[actix_rt::test]
async fn invite_candidates_come_from_user_listing() {
    let harness = Harness::start(false).await;
    let alice = session("u1");
    harness.services.store.load(&alice).await.expect("load");

    let candidates = harness
        .services
        .editor
        .invite_candidates(&alice, &list_id("l1"))
        .await
        .expect("candidates");

    let ids: Vec<_> = candidates
        .iter()
        .map(|user| user.id().as_ref().to_owned())
        .collect();
    assert_eq!(ids, vec!["u3".to_owned()]);
    harness.stop().await;
}

#[actix_rt::test]
async fn delete_removes_list_on_both_sides() {
    let harness = Harness::start(false).await;
    let bob = session("u2");
    harness.services.store.load(&bob).await.expect("load");

    harness
        .services
        .store
        .delete_list(&bob, &list_id("l2"))
        .await
        .expect("deleted");

    assert!(harness.services.store.get_list_by_id(&list_id("l2")).is_err());
    assert!(
        harness
            .state
            .lock()
            .expect("lock")
            .lists
            .iter()
            .all(|doc| doc["_id"] != "l2")
    );
    harness.stop().await;
}
