//! Integration tests for search_articles using mocked HTTP responses
//!
//! A wiremock server stands in for NCBI ESearch, so these tests check the
//! request parameters and the response handling without network access.

use std::time::Duration;

use biolitminer_client::{ClientConfig, PubMedClient};
use rstest::rstest;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ESEARCH_RESPONSE_3_IDS: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult>
    <Count>1523</Count>
    <RetMax>3</RetMax>
    <RetStart>0</RetStart>
    <IdList>
        <Id>31978945</Id>
        <Id>33515491</Id>
        <Id>25760099</Id>
    </IdList>
    <QueryTranslation>"covid-19"[All Fields]</QueryTranslation>
</eSearchResult>"#;

const ESEARCH_RESPONSE_EMPTY: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<eSearchResult>
    <Count>0</Count>
    <RetMax>0</RetMax>
    <RetStart>0</RetStart>
    <IdList/>
    <ErrorList>
        <PhraseNotFound>qwertyuiopasdf</PhraseNotFound>
    </ErrorList>
</eSearchResult>"#;

const ESEARCH_RESPONSE_ERROR: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<eSearchResult>
    <ERROR>Invalid query syntax</ERROR>
</eSearchResult>"#;

fn mocked_client(server: &MockServer) -> PubMedClient {
    let config = ClientConfig::new()
        .with_email("tester@example.org")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
        .with_min_interval(Duration::ZERO);
    PubMedClient::with_config(config).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_search_sends_expected_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "covid-19 treatment"))
        .and(query_param("retmax", "3"))
        .and(query_param("retmode", "xml"))
        .and(query_param("email", "tester@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_3_IDS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    let pmids = client.search_articles("covid-19 treatment", 3).await;

    assert_eq!(pmids, vec!["31978945", "33515491", "25760099"]);
    assert!(logs_contain("Search completed"));
}

#[rstest]
#[case(1, 1)]
#[case(2, 2)]
#[case(3, 3)]
#[case(10, 3)]
#[tokio::test]
async fn test_search_never_exceeds_max_results(#[case] max_results: usize, #[case] expected: usize) {
    let mock_server = MockServer::start().await;

    // The mock ignores retmax, as a misbehaving server would
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_3_IDS))
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    let pmids = client.search_articles("covid-19", max_results).await;

    assert_eq!(pmids.len(), expected);
    assert!(pmids.len() <= max_results);
}

#[tokio::test]
async fn test_search_no_matches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_EMPTY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.search_articles("qwertyuiopasdf", 10).await.is_empty());
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
#[tokio::test]
async fn test_blank_query_makes_no_request(#[case] query: &str) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_3_IDS))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.search_articles(query, 10).await.is_empty());
}

#[rstest]
#[case(400)]
#[case(404)]
#[case(500)]
#[case(503)]
#[tokio::test]
async fn test_search_http_error_returns_empty(#[case] status: u16) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.search_articles("covid-19", 10).await.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_search_malformed_xml_returns_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<eSearchResult><IdList><Id>1</Id>"),
        )
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.search_articles("covid-19", 10).await.is_empty());
    assert!(logs_contain("Error searching PubMed"));
}

#[tokio::test]
#[traced_test]
async fn test_search_provider_error_element_is_logged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_ERROR))
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.search_articles("AND OR", 10).await.is_empty());
    assert!(logs_contain("NCBI ESearch reported an error"));
}

#[tokio::test]
async fn test_search_uses_updated_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("email", "second@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_3_IDS))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    client.set_email("second@example.org");

    assert_eq!(client.search_articles("covid-19", 3).await.len(), 3);
}
