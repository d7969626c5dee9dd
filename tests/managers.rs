use std::io::Write;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dify_kb::payload::{
    DatasetSpec, DatasetUpdateSpec, DocumentMetadataOperation, DocumentMetadataValue,
    ExternalRetrievalModel, FileDocumentSpec, IndexingTechnique, ListDatasetsQuery, ListQuery,
    ListSegmentsQuery, MetadataType, Pagination, Reranker, RetrievalModelConfig, SearchMethod,
    SegmentUpdate, TextDocumentSpec, TextDocumentUpdate,
};
use dify_kb::payload::{build_segment, FileDocumentUpdate};
use dify_kb::{Client, Credentials, Error};

fn client_for(server: &MockServer) -> Client {
    Client::new(Credentials::new("test-key", format!("{}/v1", server.uri())).unwrap()).unwrap()
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"result": "success"}))
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

// ============ Knowledge bases ============

#[tokio::test]
async fn test_list_datasets_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("include_all", "true"))
        .and(query_param("keyword", "docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListDatasetsQuery {
        keyword: Some("docs".into()),
        tag_ids: vec!["t1".into(), "t2".into()],
        pagination: Pagination { page: 2, limit: 5 },
        include_all: true,
    };
    client_for(&server).knowledge_bases().list(&query).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let tags: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "tag_ids")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(tags, vec!["t1", "t2"]);
}

#[tokio::test]
async fn test_list_datasets_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "20"))
        .and(query_param("include_all", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .knowledge_bases()
        .list(&ListDatasetsQuery::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_dataset_minimal_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets"))
        .and(body_json(json!({
            "name": "Product Docs",
            "permission": "only_me",
            "provider": "vendor"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server)
        .knowledge_bases()
        .create(&DatasetSpec::new("Product Docs"))
        .await
        .unwrap();
    assert_eq!(value["id"], "ds-1");
}

#[tokio::test]
async fn test_create_dataset_with_retrieval_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds-1"})))
        .mount(&server)
        .await;

    let mut spec = DatasetSpec::new("KB");
    spec.description = Some(String::new());
    spec.indexing_technique = Some(IndexingTechnique::HighQuality);
    spec.retrieval_model = Some(RetrievalModelConfig {
        search_method: SearchMethod::Hybrid,
        weights: Some(0.7),
        ..Default::default()
    });
    client_for(&server).knowledge_bases().create(&spec).await.unwrap();

    let body = last_body(&server).await;
    assert!(body.get("description").is_none());
    assert_eq!(body["indexing_technique"], "high_quality");
    let rm = &body["retrieval_model"];
    assert_eq!(rm["search_method"], "hybrid_search");
    assert_eq!(rm["reranking_enable"], false);
    assert_eq!(rm["reranking_mode"], Value::Null);
    assert_eq!(rm["reranking_model"]["reranking_provider_name"], "");
    assert_eq!(rm["top_k"], 2);
    assert_eq!(rm["weights"], 0.7);
    assert!(rm.as_object().unwrap().contains_key("score_threshold"));
}

#[tokio::test]
async fn test_update_dataset_is_sparse_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/datasets/ds-1"))
        .and(body_json(json!({
            "name": "Renamed",
            "partial_member_list": ["u1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let spec = DatasetUpdateSpec {
        name: Some("Renamed".into()),
        description: Some(String::new()),
        partial_member_list: Some(vec!["u1".into()]),
        ..Default::default()
    };
    client_for(&server)
        .knowledge_bases()
        .update("ds-1", &spec)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_dataset_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/datasets/ds-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server)
        .knowledge_bases()
        .delete("ds-1")
        .await
        .unwrap();
    assert_eq!(value, json!({"success": true}));
}

#[tokio::test]
async fn test_embedding_models_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/workspaces/current/models/model-types/text-embedding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .knowledge_bases()
        .embedding_models()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_dataset_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets/ds-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds-1", "name": "KB"})))
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server).knowledge_bases().get(" ds-1 ").await.unwrap();
    assert_eq!(value["name"], "KB");
}

#[tokio::test]
async fn test_empty_dataset_id_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).knowledge_bases().get("  ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

// ============ Documents ============

#[tokio::test]
async fn test_create_document_from_text_defaults_to_automatic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/document/create-by-text"))
        .and(body_json(json!({
            "name": "Doc1",
            "text": "hello world",
            "indexing_technique": "high_quality",
            "process_rule": {"mode": "automatic"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": {"id": "doc-1", "name": "Doc1"},
            "batch": "b-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = TextDocumentSpec::new("Doc1", "hello world");
    let value = client_for(&server)
        .documents()
        .create_from_text("ds-1", &spec)
        .await
        .unwrap();
    assert_eq!(value["batch"], "b-1");

    let body = last_body(&server).await;
    assert!(body.get("doc_form").is_none());
}

#[tokio::test]
async fn test_create_document_from_file_uploads_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/document/create-by-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batch": "b-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    write!(file, "# Title\n\nBody text.").unwrap();
    let file_name = file
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    let spec = FileDocumentSpec::new(file.path());
    client_for(&server)
        .documents()
        .create_from_file("ds-1", &spec)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="data"; filename="data""#));
    assert!(body.contains(r#""process_rule":{"mode":"automatic"}"#));
    assert!(body.contains(&format!(r#"name="file"; filename="{}""#, file_name)));
    assert!(body.contains("# Title"));
}

#[tokio::test]
async fn test_create_document_from_missing_file_fails_locally() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let spec = FileDocumentSpec::new("/definitely/not/here.pdf");
    let err = client_for(&server)
        .documents()
        .create_from_file("ds-1", &spec)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FileNotFound(ref p) if p.ends_with("here.pdf")));
}

#[tokio::test]
async fn test_update_document_by_file_uploads_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/update-by-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": {"id": "doc-1", "name": "renamed.txt"},
            "batch": "b-3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(file, "replacement body").unwrap();
    let file_name = file
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    let mut spec = FileDocumentUpdate::new(file.path());
    spec.name = Some("renamed.txt".into());
    let value = client_for(&server)
        .documents()
        .update_by_file("ds-1", "doc-1", &spec)
        .await
        .unwrap();
    assert_eq!(value["batch"], "b-3");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="data"; filename="data""#));
    assert!(body.contains(r#"{"name":"renamed.txt"}"#));
    assert!(body.contains(&format!(r#"name="file"; filename="{}""#, file_name)));
    assert!(body.contains("replacement body"));
}

#[tokio::test]
async fn test_update_document_by_missing_file_fails_locally() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let spec = FileDocumentUpdate::new("/definitely/not/here.txt");
    let err = client_for(&server)
        .documents()
        .update_by_file("ds-1", "doc-1", &spec)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FileNotFound(ref p) if p.ends_with("here.txt")));
}

#[tokio::test]
async fn test_update_document_by_text_sends_only_given_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/update-by-text"))
        .and(body_json(json!({"text": "new body"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batch": "b-3"})))
        .expect(1)
        .mount(&server)
        .await;

    let update = TextDocumentUpdate {
        text: Some("new body".into()),
        ..Default::default()
    };
    client_for(&server)
        .documents()
        .update_by_text("ds-1", "doc-1", &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_document_list_status_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets/ds-1/documents"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets/ds-1/documents/b-1/indexing-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/datasets/ds-1/documents/doc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/upload-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "a.pdf"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let docs = client.documents();
    docs.list("ds-1", &ListQuery::default()).await.unwrap();
    docs.indexing_status("ds-1", "b-1").await.unwrap();
    docs.delete("ds-1", "doc-1").await.unwrap();
    let file = docs.upload_file("ds-1", "doc-1").await.unwrap();
    assert_eq!(file["name"], "a.pdf");
}

// ============ Segments ============

#[tokio::test]
async fn test_segment_update_is_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/segments/seg-1"))
        .and(body_json(json!({"segment": {"content": "", "enabled": false}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let update = SegmentUpdate {
        content: Some(String::new()),
        enabled: Some(false),
        ..Default::default()
    };
    client_for(&server)
        .segments()
        .update("ds-1", "doc-1", "seg-1", &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_segment_list_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/segments"))
        .and(query_param("status", "completed"))
        .and(query_param("keyword", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListSegmentsQuery {
        keyword: Some("rust".into()),
        status: Some("completed".into()),
        ..Default::default()
    };
    client_for(&server)
        .segments()
        .list("ds-1", "doc-1", &query)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_child_chunk_lifecycle_paths() {
    let server = MockServer::start().await;
    let base = "/v1/datasets/ds-1/documents/doc-1/segments/seg-1/child_chunks";
    Mock::given(method("POST"))
        .and(path(base))
        .and(body_json(json!({"content": "child"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "c-1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/c-1", base)))
        .and(body_json(json!({"content": "edited"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "c-1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/c-1", base)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let segments = client.segments();
    segments
        .create_child_chunk("ds-1", "doc-1", "seg-1", "child")
        .await
        .unwrap();
    segments
        .update_child_chunk("ds-1", "doc-1", "seg-1", "c-1", "edited")
        .await
        .unwrap();
    segments
        .delete_child_chunk("ds-1", "doc-1", "seg-1", "c-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_segment_add_keeps_order_and_drops_empty_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/segments"))
        .and(body_json(json!({
            "segments": [
                {"content": "first"},
                {"content": "second", "answer": "yes", "keywords": ["k1", "k2"]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let segments = vec![
        build_segment("first", Some(String::new()), Some(vec![])),
        build_segment(
            "second",
            Some("yes".into()),
            Some(vec!["k1".into(), "k2".into()]),
        ),
    ];
    client_for(&server)
        .segments()
        .add("ds-1", "doc-1", &segments)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_segment_delete_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/segments/seg-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server)
        .segments()
        .delete("ds-1", "doc-1", "seg-1")
        .await
        .unwrap();
    assert_eq!(value, json!({"success": true}));
}

#[tokio::test]
async fn test_segment_id_with_query_characters_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let segments = client.segments();
    for (doc, seg) in [("doc-1?x=1", "seg-1"), ("doc-1", "seg#1"), ("doc-1", "..")] {
        let err = segments.delete("ds-1", doc, seg).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{} {}", doc, seg);
    }
}

#[tokio::test]
async fn test_list_child_chunks_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/v1/datasets/ds-1/documents/doc-1/segments/seg-1/child_chunks",
        ))
        .and(query_param("page", "3"))
        .and(query_param("limit", "15"))
        .and(query_param("keyword", "needle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "c-1", "content": "needle here"}],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery {
        keyword: Some("needle".into()),
        pagination: Pagination { page: 3, limit: 15 },
    };
    let value = client_for(&server)
        .segments()
        .list_child_chunks("ds-1", "doc-1", "seg-1", &query)
        .await
        .unwrap();
    assert_eq!(value["data"][0]["id"], "c-1");
}

// ============ Retrieval & metadata ============

#[tokio::test]
async fn test_retrieve_with_reranker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = RetrievalModelConfig {
        search_method: SearchMethod::Semantic,
        top_k: 4,
        reranking_enabled: true,
        reranking: Some(Reranker::new("cohere", "rerank-v3")),
        ..Default::default()
    };
    let external = ExternalRetrievalModel {
        top_k: 3,
        score_threshold: None,
        score_threshold_enabled: false,
    };
    client_for(&server)
        .retrieval()
        .retrieve("ds-1", "what is rust", Some(&config), Some(&external))
        .await
        .unwrap();

    let body = last_body(&server).await;
    assert_eq!(body["query"], "what is rust");
    assert_eq!(
        body["retrieval_model"]["reranking_mode"],
        json!({"reranking_provider_name": "cohere", "reranking_model_name": "rerank-v3"})
    );
    assert_eq!(body["retrieval_model"]["top_k"], 4);
    assert_eq!(
        body["external_retrieval_model"],
        json!({"top_k": 3, "score_threshold_enabled": false})
    );
}

#[tokio::test]
async fn test_retrieve_without_override_sends_query_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/retrieve"))
        .and(body_json(json!({"query": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .retrieval()
        .retrieve("ds-1", "hello", None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_metadata_operations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/metadata"))
        .and(body_json(json!({"type": "number", "name": "pages"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/datasets/ds-1/metadata/m-1"))
        .and(body_json(json!({"name": "page_count"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/metadata/built-in/disable"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/documents/metadata"))
        .and(body_json(json!({
            "operation_data": [{
                "document_id": "doc-1",
                "metadata_list": [{"id": "m-1", "value": 12, "name": "page_count"}]
            }]
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let retrieval = client.retrieval();
    retrieval
        .create_metadata("ds-1", MetadataType::Number, "pages")
        .await
        .unwrap();
    retrieval
        .update_metadata("ds-1", "m-1", "page_count")
        .await
        .unwrap();
    retrieval
        .toggle_builtin_metadata("ds-1", "disable")
        .await
        .unwrap();
    let op = DocumentMetadataOperation {
        document_id: "doc-1".into(),
        metadata_list: vec![DocumentMetadataValue {
            id: "m-1".into(),
            value: json!(12),
            name: "page_count".into(),
        }],
    };
    retrieval
        .update_documents_metadata("ds-1", &[op])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_and_delete_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/datasets/ds-1/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "doc_metadata": [{"id": "m-1", "name": "pages", "type": "number", "use_count": 2}],
            "built_in_field_enabled": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/datasets/ds-1/metadata/m-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let retrieval = client.retrieval();
    let list = retrieval.list_metadata("ds-1").await.unwrap();
    assert_eq!(list["doc_metadata"][0]["name"], "pages");
    let deleted = retrieval.delete_metadata("ds-1", "m-1").await.unwrap();
    assert_eq!(deleted, json!({"success": true}));
}

#[tokio::test]
async fn test_toggle_builtin_rejects_unknown_action_locally() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .retrieval()
        .toggle_builtin_metadata("ds-1", "pause")
        .await
        .unwrap_err();
    match err {
        Error::InvalidArgument(msg) => assert!(msg.contains("pause"), "{}", msg),
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}
