mod common;

use serde_json::{Value, json};
use tenantctl::binding::Binding;
use tenantctl::commands::{self, CommandError, GetTerm, Level};
use tenantctl::output::Collector;
use tenantctl::remote::types::{TermGroup, TermSet};
use tenantctl::session::Session;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{SITE, client, session, store_path};

const STORE: &str = "store-1";
const GROUP: &str = "group-geo";
const SET: &str = "set-regions";
const TERM_ID: &str = "3c4d5e6f-7a8b-4c9d-8e0f-1a2b3c4d5e6f";

fn term(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "labels": [{"name": name, "languageTag": "en-US", "isDefault": true}]
    })
}

fn page(items: Vec<Value>) -> Value {
    json!({ "value": items })
}

async fn get(server: &MockServer, route: String, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Default store → "Geo" group → "Regions" set.
async fn mount_chain(server: &MockServer) {
    get(
        server,
        format!("/sites/{SITE}/termStore"),
        json!({"id": STORE, "defaultLanguageTag": "en-US"}),
    )
    .await;
    get(
        server,
        store_path(STORE, "/groups"),
        page(vec![
            json!({"id": "group-other", "displayName": "People"}),
            json!({"id": GROUP, "displayName": "Geo"}),
        ]),
    )
    .await;
    get(
        server,
        store_path(STORE, &format!("/groups/{GROUP}/sets")),
        page(vec![json!({
            "id": SET,
            "localizedNames": [{"name": "Regions", "languageTag": "en-US"}]
        })]),
    )
    .await;
}

fn children_path(parent: Option<&str>) -> String {
    match parent {
        None => store_path(STORE, &format!("/sets/{SET}/children")),
        Some(id) => store_path(STORE, &format!("/sets/{SET}/terms/{id}/children")),
    }
}

fn get_term() -> GetTerm {
    GetTerm::new(Binding::Name("Geo".into()), Binding::Name("Regions".into()))
}

async fn run(server: &MockServer, cmd: &GetTerm) -> Result<Vec<Value>, CommandError> {
    let mut out = Collector::new();
    commands::run(cmd, &session(server), &mut out).await?;
    Ok(out.into_records())
}

#[tokio::test]
async fn no_identity_lists_every_term_with_default_fields() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    Mock::given(method("GET"))
        .and(path(children_path(None)))
        .and(query_param("$select", "id,labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            term("t-eu", "Europe"),
            term("t-am", "Americas"),
            term("t-ap", "Asia Pacific"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = run(&server, &get_term()).await.unwrap();
    assert_eq!(
        records,
        vec![
            json!({"Name": "Europe", "Id": "t-eu"}),
            json!({"Name": "Americas", "Id": "t-am"}),
            json!({"Name": "Asia Pacific", "Id": "t-ap"}),
        ]
    );
}

#[tokio::test]
async fn includes_override_projection() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    Mock::given(method("GET"))
        .and(path(children_path(None)))
        .and(query_param("$select", "id,descriptions,isDeprecated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![json!({
            "id": "t-eu",
            "descriptions": [{"description": "European region", "languageTag": "en-US"}],
            "isDeprecated": false
        })])))
        .expect(1)
        .mount(&server)
        .await;

    let cmd = get_term().with_includes(vec![
        "Id".into(),
        "Description".into(),
        "IsDeprecated".into(),
    ]);
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(
        records,
        vec![json!({"Id": "t-eu", "Description": "European region", "IsDeprecated": false})]
    );
}

/// Europe → Paris, Americas → Paris (Texas). Both children carry "Paris".
async fn mount_paris_tree(server: &MockServer, first_available: bool) {
    get(
        server,
        children_path(None),
        page(vec![term("t-eu", "Europe"), term("t-am", "Americas")]),
    )
    .await;
    let mut paris_fr = term("t-paris-fr", "Paris");
    paris_fr["isAvailableForTagging"] = json!(first_available);
    get(server, children_path(Some("t-eu")), page(vec![paris_fr])).await;
    get(
        server,
        children_path(Some("t-am")),
        page(vec![term("t-paris-tx", "Paris")]),
    )
    .await;
    get(server, children_path(Some("t-paris-fr")), page(vec![])).await;
    get(server, children_path(Some("t-paris-tx")), page(vec![])).await;
}

#[tokio::test]
async fn recursive_returns_first_match_only() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    mount_paris_tree(&server, true).await;

    let cmd = get_term()
        .with_identity(Binding::Name("paris".into()))
        .recursive(true);
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records, vec![json!({"Name": "Paris", "Id": "t-paris-fr"})]);
}

#[tokio::test]
async fn recursive_trims_unavailable_terms() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    mount_paris_tree(&server, false).await;

    let cmd = get_term()
        .with_identity(Binding::Name("Paris".into()))
        .recursive(true);
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records, vec![json!({"Name": "Paris", "Id": "t-paris-tx"})]);
}

#[tokio::test]
async fn recursive_no_match_is_not_found() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    mount_paris_tree(&server, true).await;

    let cmd = get_term()
        .with_identity(Binding::Name("Lyon".into()))
        .recursive(true);
    let err = run(&server, &cmd).await.unwrap_err();
    match err {
        CommandError::TermNotFound { binding } => assert_eq!(binding, "name 'Lyon'"),
        other => panic!("expected TermNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn recursive_searches_below_unavailable_parent() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    let mut retired = term("t-paris-old", "Paris");
    retired["isAvailableForTagging"] = json!(false);
    get(&server, children_path(None), page(vec![retired])).await;
    get(
        &server,
        children_path(Some("t-paris-old")),
        page(vec![term("t-paris-new", "Paris")]),
    )
    .await;
    get(&server, children_path(Some("t-paris-new")), page(vec![])).await;

    let cmd = get_term()
        .with_identity(Binding::Name("Paris".into()))
        .recursive(true);
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records, vec![json!({"Name": "Paris", "Id": "t-paris-new"})]);
}

#[tokio::test]
async fn recursive_stops_walking_after_first_match() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    Mock::given(method("GET"))
        .and(path(children_path(None)))
        .and(query_param("$select", "id,labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            term("t-eu", "Europe"),
            term("t-am", "Americas"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    get(
        &server,
        children_path(Some("t-eu")),
        page(vec![term("t-paris-fr", "Paris")]),
    )
    .await;
    for parent in ["t-paris-fr", "t-am"] {
        Mock::given(method("GET"))
            .and(path(children_path(Some(parent))))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let cmd = get_term()
        .with_identity(Binding::Name("Paris".into()))
        .recursive(true);
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records, vec![json!({"Name": "Paris", "Id": "t-paris-fr"})]);
}

#[tokio::test]
async fn label_search_collects_every_match_in_order() {
    let server = MockServer::start().await;
    mount_paris_tree(&server, true).await;

    let found = client(&server)
        .taxonomy(SITE)
        .find_terms_by_label(STORE, SET, "PARIS", true, &["id"])
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t-paris-fr", "t-paris-tx"]);
}

#[tokio::test]
async fn non_recursive_name_only_checks_top_level() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    mount_paris_tree(&server, true).await;

    let cmd = get_term().with_identity(Binding::Name("Paris".into()));
    let err = run(&server, &cmd).await.unwrap_err();
    assert!(matches!(err, CommandError::TermNotFound { .. }));
}

#[tokio::test]
async fn name_is_normalized_before_matching() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    get(
        &server,
        children_path(None),
        page(vec![term("t-rd", "Research \u{FF06} Development")]),
    )
    .await;

    let cmd = get_term().with_identity(Binding::Name("research   &  development".into()));
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records[0]["Id"], "t-rd");
}

#[tokio::test]
async fn id_identity_fetches_term_directly() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    Mock::given(method("GET"))
        .and(path(store_path(STORE, &format!("/sets/{SET}/terms/{TERM_ID}"))))
        .and(query_param("$select", "id,labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(term(TERM_ID, "Europe")))
        .expect(1)
        .mount(&server)
        .await;

    let cmd = get_term().with_identity(Binding::Id(Uuid::parse_str(TERM_ID).unwrap()));
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records, vec![json!({"Name": "Europe", "Id": TERM_ID})]);
}

#[tokio::test]
async fn missing_term_id_is_not_found() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    Mock::given(method("GET"))
        .and(path(store_path(STORE, &format!("/sets/{SET}/terms/{TERM_ID}"))))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "itemNotFound", "message": "no term"}
        })))
        .mount(&server)
        .await;

    let cmd = get_term().with_identity(Binding::Id(Uuid::parse_str(TERM_ID).unwrap()));
    let err = run(&server, &cmd).await.unwrap_err();
    match err {
        CommandError::TermNotFound { binding } => assert!(binding.contains(TERM_ID)),
        other => panic!("expected TermNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn unresolved_group_is_a_fault() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    Mock::given(method("GET"))
        .and(path(store_path(STORE, "/groups/missing/sets")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let cmd = GetTerm::new(Binding::Name("Nope".into()), Binding::Name("Regions".into()));
    let err = run(&server, &cmd).await.unwrap_err();
    match err {
        CommandError::Unresolved { level, binding } => {
            assert_eq!(level, Level::TermGroup);
            assert_eq!(binding, "name 'Nope'");
        }
        other => panic!("expected Unresolved, got {other:?}"),
    }
}

#[tokio::test]
async fn unresolved_set_is_a_fault() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    let missing = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
    Mock::given(method("GET"))
        .and(path(store_path(STORE, &format!("/groups/{GROUP}/sets/{missing}"))))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "itemNotFound", "message": "no set"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(children_path(None)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let cmd = GetTerm::new(Binding::Name("Geo".into()), Binding::Id(missing));
    let err = run(&server, &cmd).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Unresolved {
            level: Level::TermSet,
            ..
        }
    ));
}

#[tokio::test]
async fn handles_skip_group_and_set_lookups() {
    let server = MockServer::start().await;

    get(
        &server,
        format!("/sites/{SITE}/termStore"),
        json!({"id": STORE}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(store_path(STORE, "/groups")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(0)
        .mount(&server)
        .await;
    get(
        &server,
        children_path(None),
        page(vec![term("t-eu", "Europe")]),
    )
    .await;

    let group = TermGroup {
        id: GROUP.into(),
        display_name: Some("Geo".into()),
        description: None,
        scope: None,
    };
    let set = TermSet {
        id: SET.into(),
        localized_names: Vec::new(),
        description: None,
    };
    let cmd = GetTerm::new(Binding::Handle(group), Binding::Handle(set));
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn named_store_is_looked_up_in_store_list() {
    let server = MockServer::start().await;

    get(
        &server,
        format!("/sites/{SITE}/termStores"),
        page(vec![
            json!({"id": "store-0", "name": "Archive"}),
            json!({"id": STORE, "name": "Managed Metadata"}),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("/sites/{SITE}/termStore")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "store-0"})))
        .expect(0)
        .mount(&server)
        .await;
    get(
        &server,
        store_path(STORE, "/groups"),
        page(vec![json!({"id": GROUP, "displayName": "Geo"})]),
    )
    .await;
    get(
        &server,
        store_path(STORE, &format!("/groups/{GROUP}/sets")),
        page(vec![json!({
            "id": SET,
            "localizedNames": [{"name": "Regions"}]
        })]),
    )
    .await;
    get(&server, children_path(None), page(vec![])).await;

    let cmd = get_term().with_store(Binding::Name("managed metadata".into()));
    let records = run(&server, &cmd).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn unresolved_store_is_a_fault() {
    let server = MockServer::start().await;

    get(
        &server,
        format!("/sites/{SITE}/termStores"),
        page(vec![json!({"id": STORE, "name": "Managed Metadata"})]),
    )
    .await;

    let cmd = get_term().with_store(Binding::Name("Elsewhere".into()));
    let err = run(&server, &cmd).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Unresolved {
            level: Level::TermStore,
            ..
        }
    ));
}

#[tokio::test]
async fn include_child_terms_nests_descendants() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    mount_paris_tree(&server, true).await;

    let cmd = get_term().include_child_terms(true);
    let records = run(&server, &cmd).await.unwrap();
    assert_eq!(
        records,
        vec![
            json!({
                "Name": "Europe",
                "Id": "t-eu",
                "Terms": [{"Name": "Paris", "Id": "t-paris-fr", "Terms": []}]
            }),
            json!({
                "Name": "Americas",
                "Id": "t-am",
                "Terms": [{"Name": "Paris", "Id": "t-paris-tx", "Terms": []}]
            }),
        ]
    );
}

#[tokio::test]
async fn missing_site_is_a_session_error() {
    let server = MockServer::start().await;
    let session = Session::new(client(&server), None);

    let mut out = Collector::new();
    let err = commands::run(&get_term(), &session, &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::Session(_)));
    assert!(err.to_string().contains("no site configured"));
}
