//! End-to-end checkout scenarios against mocked backends.

#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use ethpay_core::{AccountNumber, OrderStatus, ProductId};
use ethpay_gateway::bank::BankCredentials;
use ethpay_integration_tests::TestHarness;
use ethpay_storefront::{CartLine, CheckoutError, CheckoutStage, ShippingDetails};

fn shipping() -> ShippingDetails {
    ShippingDetails {
        name: "Demo Customer".into(),
        email: "customer@demo.com".into(),
        address: "Bole Road, Addis Ababa".into(),
        phone: "+251911111111".into(),
    }
}

fn credentials() -> BankCredentials {
    BankCredentials {
        account_number: AccountNumber::new("910000001"),
        password: SecretString::from("demo-password"),
    }
}

fn fill_cart(harness: &TestHarness) {
    // 2 x 100.00: checkout total 200.00, fee 4.00, merchant 196.00.
    harness
        .cart()
        .add(CartLine {
            product_id: ProductId::new(1),
            name: "Habesha Shirt".into(),
            unit_price: dec!(100.00),
            quantity: 2,
            category: "clothing".into(),
        })
        .unwrap();
}

async fn mount_login(harness: &TestHarness) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "acc-1",
            "refresh": "ref-1",
            "userId": Uuid::new_v4(),
            "email": "customer@demo.com",
            "role": "endUser",
            "fullName": "Demo Customer",
        })))
        .mount(&harness.gateway)
        .await;
}

#[tokio::test]
async fn login_then_checkout_settles_and_reconciles() {
    let harness = TestHarness::start().await;
    mount_login(&harness).await;

    // The shop must see the bearer token issued at login.
    Mock::given(method("POST"))
        .and(path("/api/shop/orders/create/"))
        .and(bearer_token("acc-1"))
        .and(body_partial_json(json!({
            "total": "200.00",
            "payment_method": "bank_transfer",
            "status": "pending",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "order_id": "ORD-1",
            "payment_id": "PAY-1",
            "amount": "200.00",
        })))
        .expect(1)
        .mount(&harness.shop)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bank/process/"))
        .and(body_partial_json(json!({
            "payment_id": "PAY-1",
            "account_number": "910000001",
            "amount": "200.00",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "transaction_id": "TXN4F2A91BC",
            "amount": 200.00,
            "service_fee": 4.00,
            "total_deducted": 204.00,
            "merchant_received": 196.00,
            "customer_balance": 9_999_796.00,
            "merchant_balance": 196.00,
        })))
        .expect(1)
        .mount(&harness.gateway)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/shop/payment/callback/"))
        .and(body_partial_json(json!({
            "payment_id": "PAY-1",
            "status": "success",
            "transaction_id": "TXN4F2A91BC",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Payment status updated",
        })))
        .expect(1)
        .mount(&harness.shop)
        .await;

    harness
        .auth()
        .login("customer@demo.com", &SecretString::from("secret-pw"), None)
        .await
        .unwrap();
    fill_cart(&harness);

    let mut flow = harness.checkout_flow();
    let form = flow.proceed_to_payment(&shipping()).await.unwrap();
    assert_eq!(form.amount, dec!(200.00));
    assert_eq!(form.estimated_fees.service_fee, dec!(4.00));
    assert_eq!(form.estimated_fees.merchant_received, dec!(196.00));

    let receipt = flow.submit_payment(&credentials()).await.unwrap();

    // Success view invariants: confirmed transaction, exact fee split,
    // cart cleared, receipt recoverable from the store.
    assert_eq!(receipt.status, OrderStatus::Completed);
    assert_eq!(receipt.transaction_id.as_str(), "TXN4F2A91BC");
    assert_eq!(
        receipt.fee_breakdown.service_fee + receipt.fee_breakdown.merchant_received,
        dec!(200.00)
    );
    assert!(harness.cart().is_empty());
    assert_eq!(
        harness.receipts().last_payment().unwrap().transaction_id,
        receipt.transaction_id
    );
}

#[tokio::test]
async fn wrong_password_keeps_the_order_for_a_retry() {
    let harness = TestHarness::start().await;
    harness.seed_session("acc-1", "ref-1");

    Mock::given(method("POST"))
        .and(path("/api/shop/orders/create/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "order_id": "ORD-9",
            "payment_id": "PAY-9",
        })))
        .expect(1)
        .mount(&harness.shop)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bank/process/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Invalid credentials",
        })))
        .expect(1)
        .mount(&harness.gateway)
        .await;

    fill_cart(&harness);
    let mut flow = harness.checkout_flow();
    let form = flow.proceed_to_payment(&shipping()).await.unwrap();

    let err = flow.submit_payment(&credentials()).await.unwrap_err();
    match err {
        CheckoutError::Declined(reason) => assert_eq!(reason, "Invalid credentials"),
        other => panic!("expected Declined, got {other:?}"),
    }

    // Same payment id, order untouched, cart intact: the user retries
    // without re-creating anything (order creation expected exactly once).
    assert_eq!(flow.stage(), CheckoutStage::PaymentFailed);
    assert_eq!(
        harness.receipts().current_order().unwrap().payment_id,
        form.payment_id
    );
    assert!(!harness.cart().is_empty());
    assert!(harness.receipts().last_payment().is_none());
}

#[tokio::test]
async fn missing_payment_id_gets_a_client_generated_fallback() {
    let harness = TestHarness::start().await;
    harness.seed_session("acc-1", "ref-1");

    Mock::given(method("POST"))
        .and(path("/api/shop/orders/create/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "order_id": "ORD-legacy",
        })))
        .mount(&harness.shop)
        .await;

    fill_cart(&harness);
    let mut flow = harness.checkout_flow();
    let form = flow.proceed_to_payment(&shipping()).await.unwrap();

    assert!(form.payment_id.as_str().starts_with("PAY-"));
    // The fallback id is mirrored into the recovery snapshot too.
    assert_eq!(
        harness.receipts().current_order().unwrap().payment_id,
        form.payment_id
    );
}

#[tokio::test]
async fn checkout_without_a_session_redirects_to_login() {
    let harness = TestHarness::start().await;
    fill_cart(&harness);

    let mut flow = harness.checkout_flow();
    let err = flow.proceed_to_payment(&shipping()).await.unwrap_err();
    match err {
        CheckoutError::NotAuthenticated { login, return_to } => {
            assert_eq!(login, "/login");
            assert_eq!(return_to, "/checkout");
        }
        other => panic!("expected NotAuthenticated, got {other:?}"),
    }
    // No backend was touched: neither mock server has received requests.
    assert!(harness.shop.received_requests().await.unwrap().is_empty());
    assert!(harness.gateway.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn gateway_fee_endpoint_is_authoritative_with_local_fallback() {
    let harness = TestHarness::start().await;
    harness.seed_session("acc-1", "ref-1");

    // Server quotes a promotional 1% rate; the client must report it as-is.
    Mock::given(method("GET"))
        .and(path("/api/fee/calculate/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amount": 200.00,
            "serviceFee": 2.00,
            "totalAmount": 202.00,
        })))
        .expect(1)
        .mount(&harness.gateway)
        .await;

    let account = harness.account();
    let quote = account.fee_quote(dec!(200.00)).await.unwrap();
    assert_eq!(quote.service_fee, dec!(2.00));

    // A gateway outage degrades to the local 2% calculator.
    let offline = TestHarness::start().await;
    offline.seed_session("acc-1", "ref-1");
    let account = offline.account();
    drop(offline); // stops the mock servers: connection refused from here on

    let quote = account.fee_quote(dec!(200.00)).await.unwrap();
    assert_eq!(quote.service_fee, dec!(4.00));
    assert_eq!(quote.total_amount, dec!(204.00));
}
