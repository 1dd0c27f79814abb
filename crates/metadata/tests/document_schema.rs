use impact_metadata::{
    fallback_svg, validate_document, CertificateDraft, ComposeInput, MetadataComposer, Timeframe,
};
use impact_types::{AllocationEntry, ContributionRecord, MetricReading};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn record(id: &str, addr: &str) -> ContributionRecord {
    let mut metrics = BTreeMap::new();
    metrics.insert("waste_removed".to_string(), MetricReading::number(12.5, "kg"));
    ContributionRecord {
        id: id.into(),
        work_id: format!("work-{id}"),
        garden_id: "garden-42".into(),
        contributor_address: addr.into(),
        contributor_name: Some("Ana".into()),
        title: format!("Cleanup {id}"),
        work_scope: vec!["cleanup".into()],
        created_at: Some(1_704_067_200),
        approved_at: Some(1_704_153_600),
        domain: Some("waste".into()),
        metrics,
    }
}

#[test]
fn published_document_layout() {
    let mut draft = CertificateDraft::new("Beach cleanup", "Two mornings on the north shore");
    draft.sdg_goals = vec![14];
    draft.impact_timeframe = Some(Timeframe::new(1_704_067_200, 0));
    let records = vec![record("1", "0xaa"), record("2", "0xbb")];
    let allowlist = vec![
        AllocationEntry::new("0xaa", 50_000_000),
        AllocationEntry::new("0xbb", 50_000_000),
    ];

    let doc = MetadataComposer::new()
        .compose(ComposeInput {
            draft: &draft,
            records: &records,
            allowlist: Some(allowlist.as_slice()),
            generated_at: 1_710_000_000,
        })
        .into_document();
    validate_document(&doc).unwrap();

    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["name"], "Beach cleanup");
    assert!(json.get("external_url").is_none());
    assert_eq!(json["hypercert"]["work_scope"]["value"], serde_json::json!(["cleanup"]));
    assert_eq!(json["hypercert"]["impact_scope"]["display_value"], "all");
    assert_eq!(
        json["hypercert"]["work_timeframe"]["value"],
        serde_json::json!([1_704_067_200, 1_704_153_600])
    );
    assert_eq!(json["hypercert"]["contributors"]["value"], serde_json::json!(["0xaa", "0xbb"]));
    assert_eq!(json["hypercert"]["rights"]["value"], serde_json::json!(["Public Display"]));

    let hidden = &json["hidden_properties"];
    assert_eq!(hidden["garden_id"], "garden-42");
    assert_eq!(hidden["attestations"][0]["id"], "1");
    assert_eq!(hidden["sdg_goals"], serde_json::json!([14]));
    assert_eq!(hidden["domain"], "waste");
    assert_eq!(hidden["protocol_version"], "1.0");
    assert_eq!(hidden["outcomes"]["predefined"]["waste_removed"]["value"], 25.0);
    assert_eq!(hidden["outcomes"]["predefined"]["waste_removed"]["label"], "Waste Removed");
    assert_eq!(hidden["outcomes"]["predefined"]["attestation_count"]["aggregation"], "count");
}

#[test]
fn composition_is_deterministic() {
    let draft = CertificateDraft::new("Beach cleanup", "Two mornings");
    let records = vec![record("1", "0xaa")];
    let input = ComposeInput {
        draft: &draft,
        records: &records,
        allowlist: None,
        generated_at: 1_710_000_000,
    };
    let composer = MetadataComposer::new();
    assert_eq!(composer.compose(input), composer.compose(input));
}

proptest! {
    #[test]
    fn fallback_markup_is_fixed_by_template(title in ".{0,80}", collection in ".{0,40}") {
        let reference = fallback_svg("x", Some("y"));
        let svg = fallback_svg(&title, Some(&collection));
        let has_collection = !collection.trim().is_empty();
        let expected_tags = reference.matches('<').count() - if has_collection { 0 } else { 2 };

        prop_assert_eq!(svg.matches('<').count(), expected_tags);
        prop_assert_eq!(svg.matches('>').count(), expected_tags);
    }
}
