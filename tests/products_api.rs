//! Product Routes Tests
//!
//! Drives `/wc/blocks/products` through the router: permissions, filter
//! translation against the in-memory catalog, projection and the route
//! description.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get_as, ids, router, send, EDITOR, SUBSCRIBER};
use storefront_blocks::rest_api::response::{TOTAL_HEADER, TOTAL_PAGES_HEADER};
use storefront_blocks::rest_api::products::BlockProducts;
use storefront_blocks::rest_api::ResourceHooks;
use storefront_blocks::schema::SchemaValidator;

// =============================================================================
// PERMISSIONS
// =============================================================================

#[tokio::test]
async fn test_anonymous_listing_requires_authentication() {
    let response = send(router(), Method::GET, "/wc/blocks/products", &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "woocommerce_rest_cannot_view");
    assert_eq!(response.body["message"], "Sorry, you cannot list resources.");
    assert_eq!(response.body["data"]["status"], 401);
}

#[tokio::test]
async fn test_user_without_edit_posts_is_forbidden() {
    let response = get_as("/wc/blocks/products/1", SUBSCRIBER).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Sorry, you cannot view this resource.");
    assert_eq!(response.body["data"]["status"], 403);
}

#[tokio::test]
async fn test_unknown_token_is_anonymous() {
    let response = get_as("/wc/blocks/products", "nobody").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// LISTING
// =============================================================================

#[tokio::test]
async fn test_default_listing_newest_first_without_variations() {
    let response = get_as("/wc/blocks/products", EDITOR).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body), vec![6, 3, 2, 1]);
    assert_eq!(response.headers[TOTAL_HEADER], "4");
    assert_eq!(response.headers[TOTAL_PAGES_HEADER], "1");
}

#[tokio::test]
async fn test_pagination_headers() {
    let response = get_as("/wc/blocks/products?per_page=3&page=2", EDITOR).await;

    assert_eq!(ids(&response.body), vec![1]);
    assert_eq!(response.headers[TOTAL_HEADER], "4");
    assert_eq!(response.headers[TOTAL_PAGES_HEADER], "2");
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let response = get_as(
        "/wc/blocks/products?page=999999999999999999&per_page=100",
        EDITOR,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.as_array().unwrap().is_empty());
    assert_eq!(response.headers[TOTAL_HEADER], "4");
    assert_eq!(response.headers[TOTAL_PAGES_HEADER], "1");
}

#[tokio::test]
async fn test_per_page_above_limit_rejected() {
    let response = get_as("/wc/blocks/products?per_page=101", EDITOR).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "rest_invalid_param");
    assert!(response.body["data"]["params"]["per_page"].is_string());
}

#[tokio::test]
async fn test_extended_orderby_accepted() {
    let response = get_as("/wc/blocks/products?orderby=menu_order&order=asc", EDITOR).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body), vec![1, 2, 3, 6]);
}

// =============================================================================
// TAXONOMY OPERATORS
// =============================================================================

#[tokio::test]
async fn test_category_in_includes_child_categories() {
    let response = get_as("/wc/blocks/products?category=10&orderby=id&order=asc", EDITOR).await;
    assert_eq!(ids(&response.body), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_category_and_matches_exact_terms() {
    let response = get_as(
        "/wc/blocks/products?category=10&category_operator=and&orderby=id&order=asc",
        EDITOR,
    )
    .await;
    assert_eq!(ids(&response.body), vec![1, 3]);
}

#[tokio::test]
async fn test_category_not_in_excludes_tree() {
    let response = get_as("/wc/blocks/products?category=10&category_operator=NOT_IN", EDITOR).await;
    assert_eq!(ids(&response.body), vec![6]);
}

#[tokio::test]
async fn test_tag_not_in() {
    let response = get_as(
        "/wc/blocks/products?tag=20&tag_operator=not_in&orderby=id&order=asc",
        EDITOR,
    )
    .await;
    assert_eq!(ids(&response.body), vec![2, 3, 6]);
}

#[tokio::test]
async fn test_attribute_operator_applies_to_registered_attribute() {
    let response = get_as(
        "/wc/blocks/products?attribute=pa_color&attribute_term=30&attribute_operator=not_in&orderby=id&order=asc",
        EDITOR,
    )
    .await;
    assert_eq!(ids(&response.body), vec![2, 3, 6]);
}

#[tokio::test]
async fn test_unknown_operator_rejected() {
    for uri in [
        "/wc/blocks/products?category_operator=or",
        "/wc/blocks/products?tag_operator=",
    ] {
        let response = get_as(uri, EDITOR).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.body["code"], "rest_invalid_param");
    }
}

// =============================================================================
// CATALOG VISIBILITY
// =============================================================================

#[tokio::test]
async fn test_catalog_visibility_filters() {
    let cases = [
        ("any", vec![1, 2, 3, 6]),
        ("visible", vec![1, 6]),
        ("catalog", vec![1, 2, 6]),
        ("search", vec![1, 6]),
        ("hidden", vec![3]),
    ];
    for (visibility, expected) in cases {
        let uri = format!(
            "/wc/blocks/products?catalog_visibility={}&orderby=id&order=asc",
            visibility
        );
        let response = get_as(&uri, EDITOR).await;
        assert_eq!(ids(&response.body), expected, "catalog_visibility={}", visibility);
    }
}

#[tokio::test]
async fn test_unknown_visibility_rejected() {
    let response = get_as("/wc/blocks/products?catalog_visibility=secret", EDITOR).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["data"]["params"]["catalog_visibility"].is_string());
}

// =============================================================================
// SINGLE PRODUCT
// =============================================================================

#[tokio::test]
async fn test_simple_product_projection() {
    let response = get_as("/wc/blocks/products/1", EDITOR).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = &response.body;
    assert_eq!(body["name"], "Beanie");
    assert_eq!(body["variation"], "");
    assert_eq!(body["description"], "Warm and woolly.");
    assert_eq!(body["onsale"], true);
    assert_eq!(body["price"], "18.00");
    assert_eq!(body["average_rating"], "4.50");
    assert_eq!(body["prices"]["currency_code"], "USD");
    assert_eq!(body["prices"]["price_prefix"], "$");
    assert_eq!(body["prices"]["price_suffix"], "");
    assert_eq!(body["prices"]["regular_price"], "20.00");
    assert_eq!(body["prices"]["sale_price"], "18.00");
    assert!(body["prices"]["price_range"].is_null());
    assert_eq!(
        body["add_to_cart"],
        json!({
            "text": "Add to cart",
            "description": "Add \u{201c}Beanie\u{201d} to your cart",
            "supports_ajax": true,
        })
    );

    let image_ids: Vec<u64> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["id"].as_u64().unwrap())
        .collect();
    assert_eq!(image_ids, vec![100, 101]);
    assert_eq!(body["images"][0]["thumbnail"], "https://shop.test/beanie-300.jpg");
    assert_eq!(body["images"][0]["alt"], "A blue beanie");
    assert_eq!(body["images"][1]["srcset"], "");
}

#[tokio::test]
async fn test_variable_product_price_range() {
    let response = get_as("/wc/blocks/products/3", EDITOR).await;

    // Parent price comes from the cheapest purchasable variation
    assert_eq!(response.body["price"], "15.00");
    assert_eq!(response.body["prices"]["price"], "15.00");
    assert_eq!(response.body["prices"]["sale_price"], "");
    assert_eq!(response.body["onsale"], false);
    assert_eq!(
        response.body["prices"]["price_range"],
        json!({"min_amount": "15.00", "max_amount": "20.00"})
    );
    assert_eq!(response.body["add_to_cart"]["text"], "Select options");
}

#[tokio::test]
async fn test_grouped_product_price_range() {
    let response = get_as("/wc/blocks/products/6", EDITOR).await;
    assert_eq!(
        response.body["prices"]["price_range"],
        json!({"min_amount": "18.00", "max_amount": "45.00"})
    );
    assert_eq!(response.body["add_to_cart"]["text"], "View products");
}

#[tokio::test]
async fn test_variation_label() {
    let response = get_as("/wc/blocks/products/4", EDITOR).await;
    assert_eq!(response.body["variation"], "Size: Small");
}

#[tokio::test]
async fn test_embed_context_trims_fields() {
    let response = get_as("/wc/blocks/products/1?context=embed", EDITOR).await;

    let mut keys: Vec<String> = response.body.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["description", "id", "images", "name", "permalink", "variation"]
    );
}

#[tokio::test]
async fn test_unknown_product_not_found() {
    for uri in ["/wc/blocks/products/999", "/wc/blocks/products/beanie"] {
        let response = get_as(uri, EDITOR).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["code"], "woocommerce_rest_product_invalid_id");
        assert_eq!(response.body["message"], "Invalid ID.");
    }
}

#[tokio::test]
async fn test_every_listed_product_conforms_to_schema() {
    let schema = BlockProducts.item_schema();
    let validator = SchemaValidator::new(&schema);

    let response = get_as("/wc/blocks/products?context=edit", EDITOR).await;
    for item in response.body.as_array().unwrap() {
        validator.validate(item).unwrap();
    }
}

// =============================================================================
// ROUTE DESCRIPTION
// =============================================================================

#[tokio::test]
async fn test_options_describes_route() {
    let response = send(router(), Method::OPTIONS, "/wc/blocks/products", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["namespace"], "wc/blocks");
    let args = &response.body["endpoints"][0]["args"];
    assert_eq!(args["category_operator"]["enum"], json!(["in", "not_in", "and"]));
    assert_eq!(args["category_operator"]["default"], "in");
    assert!(args["catalog_visibility"].get("default").is_none());
    assert_eq!(response.body["schema"]["title"], "product_block_product");
    assert_eq!(
        response.body["schema"]["properties"]["prices"]["properties"]["price_range"]["type"],
        json!(["object", "null"])
    );
}
