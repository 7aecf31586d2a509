mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn create_normalizes_and_list_returns_it() -> Result<()> {
    let server = common::start_server().await?;
    let client = common::login(&server, &common::ANA).await?;

    let (status, created) = common::post_json(
        &client,
        server.url("/api/companies"),
        &json!({ "instrument": "  DIGI ", "isin": "RO123456789A", "issuer": "Digi Communications" }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["instrument"], "DIGI");
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(id.len(), 24);

    let (status, list) = common::get_json(&client, server.url("/api/companies")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["isin"], "RO123456789A");

    Ok(())
}

#[tokio::test]
async fn lowercase_isin_is_rejected_with_details() -> Result<()> {
    let server = common::start_server().await?;
    let client = common::login(&server, &common::ANA).await?;

    let (status, body) = common::post_json(
        &client,
        server.url("/api/companies"),
        &json!({ "instrument": "DIGI", "isin": "ro123456789a", "issuer": "Digi Communications" }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "isin");

    Ok(())
}

#[tokio::test]
async fn every_invalid_field_is_reported() -> Result<()> {
    let server = common::start_server().await?;
    let client = common::login(&server, &common::ANA).await?;

    let (status, body) = common::post_json(
        &client,
        server.url("/api/companies"),
        &json!({ "instrument": "", "isin": "SHORT", "issuer": "x".repeat(201) }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|d| d["field"].as_str())
        .collect();
    for field in ["instrument", "isin", "issuer"] {
        assert!(fields.contains(&field), "{field} missing from {fields:?}");
    }

    Ok(())
}

#[tokio::test]
async fn duplicate_instrument_conflicts_within_one_partition_only() -> Result<()> {
    let server = common::start_server().await?;
    let ana = common::login(&server, &common::ANA).await?;
    let bob = common::login(&server, &common::BOB).await?;

    let (status, _) = common::post_json(&ana, server.url("/api/companies"), &common::digi()).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = common::post_json(&ana, server.url("/api/companies"), &common::digi()).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Company with this instrument already exists");

    let (status, _) = common::post_json(&bob, server.url("/api/companies"), &common::digi()).await?;
    assert_eq!(status, StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn partitions_do_not_see_each_other() -> Result<()> {
    let server = common::start_server().await?;
    let ana = common::login(&server, &common::ANA).await?;
    let bob = common::login(&server, &common::BOB).await?;

    let (_, created) = common::post_json(&ana, server.url("/api/companies"), &common::digi()).await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (_, list) = common::get_json(&bob, server.url("/api/companies")).await?;
    assert_eq!(list, json!([]));

    let (status, _) = common::delete(&bob, server.url(&format!("/api/companies/{id}"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn update_checks_conflicts_against_other_records() -> Result<()> {
    let server = common::start_server().await?;
    let client = common::login(&server, &common::ANA).await?;

    common::post_json(&client, server.url("/api/companies"), &common::digi()).await?;
    let (_, other) = common::post_json(
        &client,
        server.url("/api/companies"),
        &json!({ "instrument": "TLV", "isin": "ROTLVAACNOR1", "issuer": "Banca Transilvania" }),
    )
    .await?;
    let id = other["id"].as_str().unwrap_or_default().to_string();
    let url = server.url(&format!("/api/companies/{id}"));

    // Renaming onto an existing instrument conflicts.
    let (status, _) = common::put_json(&client, url.clone(), &common::digi()).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // Re-saving its own key does not.
    let (status, body) = common::put_json(
        &client,
        url,
        &json!({ "instrument": "TLV", "isin": "ROTLVAACNOR1", "issuer": "Banca Transilvania SA" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    Ok(())
}

#[tokio::test]
async fn delete_twice_then_404_and_malformed_id_is_400() -> Result<()> {
    let server = common::start_server().await?;
    let client = common::login(&server, &common::ANA).await?;

    let (_, created) = common::post_json(&client, server.url("/api/companies"), &common::digi()).await?;
    let url = server.url(&format!("/api/companies/{}", created["id"].as_str().unwrap_or_default()));

    let (status, body) = common::delete(&client, url.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = common::delete(&client, url).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Company not found");

    let (status, body) = common::delete(&client, server.url("/api/companies/not-an-id")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid company ID format");

    Ok(())
}

#[tokio::test]
async fn update_of_absent_record_is_404() -> Result<()> {
    let server = common::start_server().await?;
    let client = common::login(&server, &common::ANA).await?;

    let (status, _) = common::put_json(
        &client,
        server.url("/api/companies/65f1c0ffee0000000000abcd"),
        &common::digi(),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
