use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use usaspending_api::types::{Award, AwardKind};
use usaspending_api::{Client, Config, Error, PagedSearch};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AWARD_ID: &str = "CONT_AWD_80NSSC24C0001_8000_-NONE-_-NONE-";
const RECIPIENT_ID: &str = "d2894d46-2cb3-c17b-d1cc-5f5ef00e7e74-C";

fn quick_client(server: &MockServer) -> Client {
    let config = Config::default()
        .with_base_url(&server.uri())
        .with_rate_limit(10_000, Duration::from_secs(1))
        .with_cache_enabled(false);
    Client::with_config(config).unwrap()
}

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn award_lookups_fetch_the_detail_record_up_front() {
    let server = MockServer::start().await;
    let body = load_fixture("award_contract.json");

    Mock::given(method("GET"))
        .and(path(format!("/awards/{AWARD_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let mut award = client.award(AWARD_ID).await.unwrap();

    assert_eq!(award.kind(), AwardKind::Contract);
    assert_eq!(award.id().as_deref(), Some(AWARD_ID));
    assert!(award.supports_subawards());
    assert_eq!(award.prime_award_id().await.unwrap(), "80NSSC24C0001");
    assert_eq!(
        award.total_obligations().await.unwrap(),
        Decimal::new(17221341967, 2)
    );
    assert_eq!(
        award.total_outlay().await.unwrap(),
        Decimal::new(9870031204, 2)
    );
    assert_eq!(award.piid().await.unwrap().as_deref(), Some("80NSSC24C0001"));

    let naics = award.naics().await.unwrap().unwrap();
    assert_eq!(naics.code.as_deref(), Some("336414"));

    let period = award.period_of_performance().await.unwrap();
    assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
    assert_eq!(period.end_date(), NaiveDate::from_ymd_opt(2028, 9, 30));

    let place = award.place_of_performance().await.unwrap().unwrap();
    assert_eq!(place.state_code(), Some("CA"));

    let recipient = award.recipient().await.unwrap().unwrap();
    assert_eq!(recipient.name(), Some("CALIFORNIA INSTITUTE OF TECHNOLOGY"));
    assert_eq!(recipient.uei().as_deref(), Some("U2JMKHNS5TG4"));
}

#[tokio::test]
async fn search_rows_fetch_details_lazily_and_only_once() {
    let server = MockServer::start().await;
    let detail = load_fixture("award_contract.json");

    Mock::given(method("POST"))
        .and(path("/search/spending_by_award/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "Award ID": "80NSSC24C0001",
                "Recipient Name": "CALIFORNIA INSTITUTE OF TECHNOLOGY",
                "Award Amount": 172213419.67,
                "generated_internal_id": AWARD_ID
            }],
            "page_metadata": {"page": 1, "hasNext": false}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/awards/{AWARD_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(&detail))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let mut award = client
        .awards()
        .contracts()
        .unwrap()
        .first()
        .await
        .unwrap()
        .unwrap();

    // Present in the row, so no fetch happens for these.
    assert_eq!(award.kind(), AwardKind::Contract);
    assert_eq!(award.prime_award_id().await.unwrap(), "80NSSC24C0001");
    assert_eq!(
        award.award_amount().await.unwrap(),
        Decimal::new(17221341967, 2)
    );

    // Absent from the row; the first of these triggers the one detail GET.
    let description = award.description().await.unwrap().unwrap();
    assert!(description.contains("MARS SAMPLE RETURN"));
    assert_eq!(award.fain().await.unwrap(), None);
    let period = award.period_of_performance().await.unwrap();
    assert_eq!(period.end_date(), NaiveDate::from_ymd_opt(2028, 9, 30));
}

#[tokio::test]
async fn fetched_details_never_overwrite_row_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/awards/{AWARD_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generated_unique_award_id": AWARD_ID,
            "description": "FROM THE DETAIL RECORD",
            "Award Amount": 999.0,
            "total_obligation": 555.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let row = json!({
        "generated_internal_id": AWARD_ID,
        "category": "contract",
        "Award Amount": 123.45
    });
    let mut award = Award::from_value(row, Some(&client)).unwrap();

    assert_eq!(
        award.description().await.unwrap().as_deref(),
        Some("FROM THE DETAIL RECORD")
    );
    // The row's value survives the merge; the detail's conflicting one is
    // dropped.
    assert_eq!(award.award_amount().await.unwrap(), Decimal::new(12345, 2));
    assert_eq!(award.raw()["Award Amount"], json!(123.45));
    // Keys the row lacked are filled in.
    assert_eq!(
        award.total_obligations().await.unwrap(),
        Decimal::new(55550, 2)
    );
}

#[tokio::test]
async fn agencies_fetch_their_profile_once() {
    let server = MockServer::start().await;
    let body = load_fixture("agency_profile.json");

    Mock::given(method("GET"))
        .and(path("/agency/080/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let mut agency = client.agency("080");

    assert_eq!(agency.toptier_code().as_deref(), Some("080"));
    assert_eq!(
        agency.name().await.unwrap().as_deref(),
        Some("National Aeronautics and Space Administration")
    );
    assert_eq!(agency.abbreviation().await.unwrap().as_deref(), Some("NASA"));
    assert_eq!(agency.subtier_agency_count().await.unwrap(), Some(17));

    let def_codes = agency.def_codes().await.unwrap();
    assert_eq!(def_codes.len(), 2);
    assert_eq!(def_codes[0].code, "L");
    assert_eq!(def_codes[0].disaster.as_deref(), Some("covid_19"));
    // A single url string and a list both come back as a list.
    assert_eq!(def_codes[0].urls.as_ref().map(Vec::len), Some(1));
    assert_eq!(def_codes[1].urls.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn a_fiscal_year_pins_the_profile_request() {
    let server = MockServer::start().await;
    let body = load_fixture("agency_profile.json");

    Mock::given(method("GET"))
        .and(path("/agency/080/"))
        .and(query_param("fiscal_year", "2022"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let mut agency = client.agency("080").for_fiscal_year(2022);
    assert!(agency.mission().await.unwrap().is_some());
}

#[tokio::test]
async fn recipients_load_their_profile_lazily() {
    let server = MockServer::start().await;
    let body = load_fixture("recipient_profile.json");

    Mock::given(method("GET"))
        .and(path(format!("/recipients/{RECIPIENT_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let mut recipient = client.recipient(RECIPIENT_ID);

    assert_eq!(
        recipient.business_types().await.unwrap(),
        vec!["higher_education".to_string(), "nonprofit".to_string()]
    );
    assert_eq!(recipient.total_transactions().await.unwrap(), Some(5120));
    assert_eq!(
        recipient.total_transaction_amount().await.unwrap(),
        Some(Decimal::new(291471484935, 2))
    );
    assert_eq!(recipient.name(), Some("CALIFORNIA INSTITUTE OF TECHNOLOGY"));

    let parent = recipient.parent().unwrap();
    assert_eq!(
        parent.recipient_id().as_deref(),
        Some("f7f4a82a-94f6-ec10-2d64-d0c6ea809ab1-P")
    );
}

#[tokio::test]
async fn recipient_hash_suffixes_normalize_into_the_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recipients/abc123-R/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "business_types": ["small_business"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let mut recipient = client.recipient("abc123-['C', 'R']");
    assert_eq!(recipient.recipient_id().as_deref(), Some("abc123-R"));
    assert_eq!(
        recipient.business_types().await.unwrap(),
        vec!["small_business".to_string()]
    );
}

#[tokio::test]
async fn related_records_flow_through_an_attached_award() {
    let server = MockServer::start().await;
    let body = load_fixture("award_contract.json");

    Mock::given(method("GET"))
        .and(path(format!("/awards/{AWARD_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/awards/count/transaction/{AWARD_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transactions": 3})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/awards/count/subaward/{AWARD_ID}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subawards": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let award = client.award(AWARD_ID).await.unwrap();

    assert_eq!(
        award.usa_spending_url().as_deref(),
        Some("https://www.usaspending.gov/award/CONT_AWD_80NSSC24C0001_8000_-NONE-_-NONE-/")
    );
    assert_eq!(award.transactions().unwrap().count().await.unwrap(), 3);
    assert_eq!(award.subawards().unwrap().count().await.unwrap(), 2);
    assert!(award.funding().is_ok());
}

#[tokio::test]
async fn subaward_searches_are_refused_for_unsupported_kinds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/CONT_IDV_X_080/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generated_unique_award_id": "CONT_IDV_X_080",
            "category": "idv",
            "type": "IDV_A"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = quick_client(&server);
    let award = client.award("CONT_IDV_X_080").await.unwrap();
    assert_eq!(award.kind(), AwardKind::Idv);
    let err = award.subawards().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Subawards are not available for idv awards"
    );
}

#[tokio::test]
async fn detached_awards_never_fetch() {
    let mut award = Award::from_value(
        json!({"generated_internal_id": AWARD_ID, "category": "loan"}),
        None,
    )
    .unwrap();

    assert_eq!(award.kind(), AwardKind::Loan);
    assert_eq!(award.description().await.unwrap(), None);
    assert_eq!(award.total_obligations().await.unwrap(), Decimal::ZERO);
    match award.transactions().unwrap_err() {
        Error::Validation(message) => {
            assert!(message.contains("not attached to a client"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_award_ids_are_rejected_before_any_request() {
    let server = MockServer::start().await;
    let client = quick_client(&server);
    let err = client.award("  ").await.unwrap_err();
    assert_eq!(err.to_string(), "award_id cannot be empty");
}
