//! Integration tests for fetch_articles and search_and_fetch using mocked
//! HTTP responses
//!
//! These tests verify batch fetching and per-record tolerance without real
//! API calls. They use wiremock to simulate NCBI ESearch and EFetch.

use std::time::Duration;

use biolitminer_client::{ClientConfig, PubMedClient};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Multi-article XML response for batch fetch testing
const BATCH_EFETCH_RESPONSE_3_ARTICLES: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">31978945</PMID>
            <Article PubModel="Print-Electronic">
                <Journal>
                    <JournalIssue CitedMedium="Internet">
                        <PubDate><Year>2020</Year><Month>Feb</Month></PubDate>
                    </JournalIssue>
                    <Title>Nature</Title>
                    <ISOAbbreviation>Nature</ISOAbbreviation>
                </Journal>
                <ArticleTitle>A pneumonia outbreak associated with a new coronavirus</ArticleTitle>
                <Abstract>
                    <AbstractText>In December 2019, a cluster of patients with pneumonia...</AbstractText>
                </Abstract>
                <AuthorList CompleteYN="Y">
                    <Author ValidYN="Y">
                        <LastName>Wu</LastName>
                        <ForeName>Fan</ForeName>
                        <Initials>F</Initials>
                    </Author>
                    <Author ValidYN="Y">
                        <LastName>Zhao</LastName>
                        <ForeName>Su</ForeName>
                        <Initials>S</Initials>
                    </Author>
                </AuthorList>
            </Article>
        </MedlineCitation>
        <PubmedData>
            <ArticleIdList>
                <ArticleId IdType="pubmed">31978945</ArticleId>
            </ArticleIdList>
        </PubmedData>
    </PubmedArticle>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">33515491</PMID>
            <Article PubModel="Print">
                <Journal>
                    <ISOAbbreviation>Lancet Oncol</ISOAbbreviation>
                </Journal>
                <ArticleTitle>Cancer treatment advances in 2020</ArticleTitle>
                <Abstract>
                    <AbstractText Label="BACKGROUND">Recent advances in cancer treatment.</AbstractText>
                    <AbstractText Label="FINDINGS">Survival improved.</AbstractText>
                </Abstract>
                <AuthorList>
                    <Author>
                        <CollectiveName>Oncology Consortium</CollectiveName>
                    </Author>
                </AuthorList>
            </Article>
        </MedlineCitation>
    </PubmedArticle>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">25760099</PMID>
            <Article PubModel="Print">
                <Journal><Title>Science</Title></Journal>
                <ArticleTitle>CRISPR-Cas9 gene editing technology</ArticleTitle>
                <AuthorList>
                    <Author>
                        <LastName>Doudna</LastName>
                        <ForeName>Jennifer</ForeName>
                    </Author>
                </AuthorList>
            </Article>
        </MedlineCitation>
    </PubmedArticle>
</PubmedArticleSet>"#;

/// One good record, one without `Article`, one without `MedlineCitation`
const PARTIAL_EFETCH_RESPONSE: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
    <PubmedArticle>
        <MedlineCitation>
            <PMID Version="1">11111111</PMID>
            <Article>
                <Journal><Title>Good Journal</Title></Journal>
                <ArticleTitle>Complete record</ArticleTitle>
            </Article>
        </MedlineCitation>
    </PubmedArticle>
    <PubmedArticle>
        <MedlineCitation>
            <PMID Version="1">22222222</PMID>
        </MedlineCitation>
    </PubmedArticle>
    <PubmedArticle>
        <PubmedData/>
    </PubmedArticle>
</PubmedArticleSet>"#;

const ESEARCH_RESPONSE_2_IDS: &str = r#"<?xml version="1.0" ?>
<eSearchResult>
    <Count>2</Count>
    <IdList>
        <Id>31978945</Id>
        <Id>33515491</Id>
    </IdList>
</eSearchResult>"#;

const ESEARCH_RESPONSE_EMPTY: &str = r#"<?xml version="1.0" ?>
<eSearchResult><Count>0</Count><IdList></IdList></eSearchResult>"#;

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
async fn test_fetch_articles_batch_single_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "31978945,33515491,25760099"))
        .and(query_param("retmode", "xml"))
        .and(query_param("rettype", "abstract"))
        .and(query_param("email", "tester@example.org"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(BATCH_EFETCH_RESPONSE_3_ARTICLES),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    let articles = client
        .fetch_articles(&["31978945", "33515491", "25760099"])
        .await;

    assert_eq!(articles.len(), 3);

    let first = &articles[0];
    assert_eq!(first.pmid, "31978945");
    assert_eq!(first.journal, "Nature");
    assert_eq!(first.publication_date.as_deref(), Some("2020"));
    assert_eq!(first.authors.len(), 2);
    assert_eq!(first.authors[0].last_name, "Wu");
    assert_eq!(first.authors[0].first_name, "Fan");
    assert_eq!(first.authors[0].initials, "F");

    let second = &articles[1];
    assert_eq!(second.journal, "Lancet Oncol");
    assert_eq!(
        second.abstract_text,
        "BACKGROUND: Recent advances in cancer treatment. FINDINGS: Survival improved."
    );
    assert_eq!(second.authors[0].last_name, "Oncology Consortium");
    assert!(second.authors[0].first_name.is_empty());
    assert_eq!(second.publication_date, None);

    let third = &articles[2];
    assert_eq!(third.abstract_text, "");
    assert_eq!(third.authors[0].initials, "");
}

#[tokio::test]
async fn test_fetch_articles_accepts_owned_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(BATCH_EFETCH_RESPONSE_3_ARTICLES),
        )
        .mount(&mock_server)
        .await;

    let pmids: Vec<String> = vec!["31978945".into(), "33515491".into(), "25760099".into()];
    let mut client = mocked_client(&mock_server);

    assert_eq!(client.fetch_articles(&pmids).await.len(), 3);
}

#[tokio::test]
#[traced_test]
async fn test_fetch_articles_skips_incomplete_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PARTIAL_EFETCH_RESPONSE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pmids = ["11111111", "22222222", "33333333"];
    let mut client = mocked_client(&mock_server);
    let articles = client.fetch_articles(&pmids).await;

    assert_eq!(articles.len(), 1);
    assert!(articles.len() <= pmids.len());
    assert_eq!(articles[0].pmid, "11111111");
    assert!(logs_contain("Failed to parse article, skipping"));
    assert!(logs_contain("22222222"));
}

#[tokio::test]
async fn test_fetch_articles_empty_input_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    let empty: Vec<String> = Vec::new();

    assert!(client.fetch_articles(&empty).await.is_empty());
}

#[tokio::test]
async fn test_fetch_articles_server_error_returns_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.fetch_articles(&["31978945"]).await.is_empty());
}

#[tokio::test]
async fn test_fetch_articles_malformed_body_returns_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi.*"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<PubmedArticleSet><PubmedArticle></PubmedArticleSet>"),
        )
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.fetch_articles(&["31978945"]).await.is_empty());
}

#[tokio::test]
async fn test_search_and_fetch_composes_both_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", "coronavirus"))
        .and(query_param("retmax", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_2_IDS))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "31978945,33515491"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(BATCH_EFETCH_RESPONSE_3_ARTICLES),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    let articles = client.search_and_fetch("coronavirus", 2).await;

    // The mock returns three records regardless of the ids requested
    assert_eq!(articles.len(), 3);
    assert_eq!(articles[0].title, "A pneumonia outbreak associated with a new coronavirus");
}

#[tokio::test]
async fn test_search_and_fetch_skips_fetch_when_nothing_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE_EMPTY))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut client = mocked_client(&mock_server);
    assert!(client.search_and_fetch("nothing matches", 10).await.is_empty());
}
