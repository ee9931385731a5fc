//! Integration tests for the inventory ledger.
//!
//! Each test runs against a fresh in-memory SQLite database and exercises
//! the full path: operation handler → delta batch → mutation coordinator →
//! repositories. All stock enters through real operations, so every
//! assertion also implicitly checks that levels stay explained by their
//! movements.

use tally_core::{AdjustmentItem, LedgerError, LineItem, SourceType};
use tally_db::{ApplyError, Database, DbConfig};

const OUTLET: &str = "outlet-1";
const PRODUCT_A: &str = "prod-a";
const PRODUCT_B: &str = "prod-b";
const PRODUCT_C: &str = "prod-c";

async fn fresh_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn on_hand(db: &Database, product_id: &str) -> i64 {
    db.levels()
        .get(product_id, OUTLET)
        .await
        .unwrap()
        .map(|l| l.quantity_on_hand)
        .unwrap_or(0)
}

/// Seeds `quantity` units of a product through a real purchase.
async fn seed_stock(db: &Database, product_id: &str, quantity: i64) {
    db.operations()
        .receive_purchase(
            &format!("seed-{product_id}"),
            &[LineItem::new(product_id, OUTLET, quantity)],
        )
        .await
        .unwrap();
}

fn unwrap_ledger_err(err: ApplyError) -> LedgerError {
    match err {
        ApplyError::Ledger(e) => e,
        ApplyError::Db(e) => panic!("expected ledger error, got db error: {e}"),
    }
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn sale_reduces_stock_and_records_one_movement() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 100).await;

    let movements = db
        .operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 30)])
        .await
        .unwrap();

    assert_eq!(on_hand(&db, PRODUCT_A).await, 70);
    assert_eq!(movements.len(), 1);

    let m = &movements[0];
    assert_eq!(m.source_type, SourceType::Sale);
    assert_eq!(m.source_id, "sale-1");
    assert_eq!(m.quantity_in, 0);
    assert_eq!(m.quantity_out, 30);
    assert_eq!(m.balance_after, 70);
}

#[tokio::test]
async fn oversell_is_rejected_with_no_effect() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 100).await;

    let err = db
        .operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 150)])
        .await
        .unwrap_err();

    assert_eq!(
        unwrap_ledger_err(err),
        LedgerError::InsufficientStock {
            product_id: PRODUCT_A.to_string(),
            outlet_id: OUTLET.to_string(),
            requested: 150,
            available: 100,
        }
    );

    // Level untouched, no sale movements recorded.
    assert_eq!(on_hand(&db, PRODUCT_A).await, 100);
    let sale_movements = db
        .movements()
        .for_source(SourceType::Sale, "sale-1")
        .await
        .unwrap();
    assert!(sale_movements.is_empty());
}

#[tokio::test]
async fn sale_of_unstocked_product_fails_level_not_found() {
    let db = fresh_db().await;

    let err = db
        .operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 1)])
        .await
        .unwrap_err();

    assert_eq!(
        unwrap_ledger_err(err),
        LedgerError::LevelNotFound {
            product_id: PRODUCT_A.to_string(),
            outlet_id: OUTLET.to_string(),
        }
    );
}

#[tokio::test]
async fn empty_sale_is_rejected_before_persistence() {
    let db = fresh_db().await;

    let err = db.operations().record_sale("sale-1", &[]).await.unwrap_err();
    assert_eq!(unwrap_ledger_err(err), LedgerError::EmptyBatch);
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn purchase_creates_missing_levels_and_shares_source_id() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 5).await;
    seed_stock(&db, PRODUCT_B, 5).await;
    // PRODUCT_C has no level yet; creation is allowed for purchases.

    let movements = db
        .operations()
        .receive_purchase(
            "po-1",
            &[
                LineItem::new(PRODUCT_A, OUTLET, 10),
                LineItem::new(PRODUCT_B, OUTLET, 5),
                LineItem::new(PRODUCT_C, OUTLET, 20),
            ],
        )
        .await
        .unwrap();

    assert_eq!(movements.len(), 3);
    assert!(movements.iter().all(|m| m.source_id == "po-1"));
    assert_eq!(on_hand(&db, PRODUCT_A).await, 15);
    assert_eq!(on_hand(&db, PRODUCT_B).await, 10);
    assert_eq!(on_hand(&db, PRODUCT_C).await, 20);
}

#[tokio::test]
async fn repeated_product_lines_apply_in_order() {
    let db = fresh_db().await;

    let movements = db
        .operations()
        .receive_purchase(
            "po-1",
            &[
                LineItem::new(PRODUCT_A, OUTLET, 10),
                LineItem::new(PRODUCT_A, OUTLET, 7),
            ],
        )
        .await
        .unwrap();

    assert_eq!(on_hand(&db, PRODUCT_A).await, 17);
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0].balance_after, 10);
    assert_eq!(movements[1].balance_after, 17);
}

// =============================================================================
// Returns
// =============================================================================

#[tokio::test]
async fn return_to_stock_creates_missing_level() {
    let db = fresh_db().await;

    db.operations()
        .return_to_stock("ret-1", &[LineItem::new(PRODUCT_A, OUTLET, 4)])
        .await
        .unwrap();

    assert_eq!(on_hand(&db, PRODUCT_A).await, 4);
}

#[tokio::test]
async fn return_to_supplier_requires_sufficient_stock() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 3).await;

    let err = db
        .operations()
        .return_to_supplier("ret-1", &[LineItem::new(PRODUCT_A, OUTLET, 5)])
        .await
        .unwrap_err();

    assert!(matches!(
        unwrap_ledger_err(err),
        LedgerError::InsufficientStock {
            requested: 5,
            available: 3,
            ..
        }
    ));
    assert_eq!(on_hand(&db, PRODUCT_A).await, 3);

    db.operations()
        .return_to_supplier("ret-2", &[LineItem::new(PRODUCT_A, OUTLET, 2)])
        .await
        .unwrap();
    assert_eq!(on_hand(&db, PRODUCT_A).await, 1);
}

// =============================================================================
// Adjustments
// =============================================================================

#[tokio::test]
async fn negative_adjustment_below_zero_is_rejected() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 30).await;

    let err = db
        .operations()
        .adjust_stock("adj-1", &[AdjustmentItem::new(PRODUCT_A, OUTLET, -40)])
        .await
        .unwrap_err();

    assert!(matches!(
        unwrap_ledger_err(err),
        LedgerError::InsufficientStock {
            requested: 40,
            available: 30,
            ..
        }
    ));
    assert_eq!(on_hand(&db, PRODUCT_A).await, 30);
}

#[tokio::test]
async fn adjustment_creates_level_and_records_balance() {
    let db = fresh_db().await;

    let movements = db
        .operations()
        .adjust_stock("adj-1", &[AdjustmentItem::new(PRODUCT_A, OUTLET, 12)])
        .await
        .unwrap();

    assert_eq!(on_hand(&db, PRODUCT_A).await, 12);
    assert_eq!(movements[0].source_type, SourceType::StockAdjustment);
    assert_eq!(movements[0].quantity_in, 12);
    assert_eq!(movements[0].balance_after, 12);

    db.operations()
        .adjust_stock("adj-2", &[AdjustmentItem::new(PRODUCT_A, OUTLET, -5)])
        .await
        .unwrap();
    assert_eq!(on_hand(&db, PRODUCT_A).await, 7);
}

// =============================================================================
// Atomicity
// =============================================================================

#[tokio::test]
async fn failing_item_aborts_the_whole_batch() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 100).await;
    seed_stock(&db, PRODUCT_B, 30).await;

    // First line is satisfiable, second is not: nothing may survive.
    let err = db
        .operations()
        .record_sale(
            "sale-1",
            &[
                LineItem::new(PRODUCT_A, OUTLET, 10),
                LineItem::new(PRODUCT_B, OUTLET, 50),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        unwrap_ledger_err(err),
        LedgerError::InsufficientStock { .. }
    ));
    assert_eq!(on_hand(&db, PRODUCT_A).await, 100);
    assert_eq!(on_hand(&db, PRODUCT_B).await, 30);
    assert!(db
        .movements()
        .for_source(SourceType::Sale, "sale-1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn first_insufficient_item_in_submission_order_is_reported() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 1).await;
    seed_stock(&db, PRODUCT_B, 1).await;

    // Both lines are individually insufficient; the first one submitted wins
    // the error report, and the batch still fails as a whole.
    let err = db
        .operations()
        .record_sale(
            "sale-1",
            &[
                LineItem::new(PRODUCT_B, OUTLET, 10),
                LineItem::new(PRODUCT_A, OUTLET, 10),
            ],
        )
        .await
        .unwrap_err();

    match unwrap_ledger_err(err) {
        LedgerError::InsufficientStock { product_id, .. } => {
            assert_eq!(product_id, PRODUCT_B);
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Reversal
// =============================================================================

#[tokio::test]
async fn voiding_a_sale_restores_stock_and_preserves_the_trail() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 70).await;

    db.operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 20)])
        .await
        .unwrap();
    assert_eq!(on_hand(&db, PRODUCT_A).await, 50);

    let original = db
        .movements()
        .for_source(SourceType::Sale, "sale-1")
        .await
        .unwrap();
    assert_eq!(original.len(), 1);

    let reverts = db
        .operations()
        .revert(SourceType::Sale, "sale-1")
        .await
        .unwrap();

    // Stock restored; compensating movement tagged sale_revert and pointing
    // at the original document.
    assert_eq!(on_hand(&db, PRODUCT_A).await, 70);
    assert_eq!(reverts.len(), 1);
    assert_eq!(reverts[0].source_type, SourceType::SaleRevert);
    assert_eq!(reverts[0].source_id, "sale-1");
    assert_eq!(reverts[0].quantity_in, 20);
    assert_eq!(reverts[0].balance_after, 70);

    // Original movements untouched: same single row as before.
    let after = db
        .movements()
        .for_source(SourceType::Sale, "sale-1")
        .await
        .unwrap();
    assert_eq!(after, original);
}

#[tokio::test]
async fn reverting_a_multi_line_purchase_inverts_every_line() {
    let db = fresh_db().await;

    db.operations()
        .receive_purchase(
            "po-1",
            &[
                LineItem::new(PRODUCT_A, OUTLET, 10),
                LineItem::new(PRODUCT_B, OUTLET, 5),
            ],
        )
        .await
        .unwrap();

    let reverts = db
        .operations()
        .revert(SourceType::Purchase, "po-1")
        .await
        .unwrap();

    assert_eq!(reverts.len(), 2);
    assert!(reverts
        .iter()
        .all(|m| m.source_type == SourceType::PurchaseRevert));
    assert_eq!(on_hand(&db, PRODUCT_A).await, 0);
    assert_eq!(on_hand(&db, PRODUCT_B).await, 0);
}

#[tokio::test]
async fn reverting_a_consumed_purchase_fails_non_negativity() {
    let db = fresh_db().await;

    db.operations()
        .receive_purchase("po-1", &[LineItem::new(PRODUCT_A, OUTLET, 10)])
        .await
        .unwrap();
    db.operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 8)])
        .await
        .unwrap();

    // Undoing the purchase would need to remove 10 units but only 2 remain.
    let err = db
        .operations()
        .revert(SourceType::Purchase, "po-1")
        .await
        .unwrap_err();

    assert!(matches!(
        unwrap_ledger_err(err),
        LedgerError::InsufficientStock {
            requested: 10,
            available: 2,
            ..
        }
    ));
    assert_eq!(on_hand(&db, PRODUCT_A).await, 2);
}

#[tokio::test]
async fn reverting_an_unknown_document_fails() {
    let db = fresh_db().await;

    let err = db
        .operations()
        .revert(SourceType::Sale, "no-such-sale")
        .await
        .unwrap_err();

    assert!(matches!(
        unwrap_ledger_err(err),
        LedgerError::NothingToRevert { .. }
    ));
}

#[tokio::test]
async fn a_revert_cannot_be_reverted() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 10).await;

    db.operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 5)])
        .await
        .unwrap();
    db.operations()
        .revert(SourceType::Sale, "sale-1")
        .await
        .unwrap();

    let err = db
        .operations()
        .revert(SourceType::SaleRevert, "sale-1")
        .await
        .unwrap_err();

    assert_eq!(
        unwrap_ledger_err(err),
        LedgerError::NotRevertible {
            source_type: SourceType::SaleRevert
        }
    );
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn movement_sum_reproduces_the_level_after_mixed_operations() {
    let db = fresh_db().await;
    let ops = db.operations();

    ops.receive_purchase("po-1", &[LineItem::new(PRODUCT_A, OUTLET, 100)])
        .await
        .unwrap();
    ops.record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 30)])
        .await
        .unwrap();
    ops.return_to_stock("ret-1", &[LineItem::new(PRODUCT_A, OUTLET, 5)])
        .await
        .unwrap();
    ops.adjust_stock("adj-1", &[AdjustmentItem::new(PRODUCT_A, OUTLET, -3)])
        .await
        .unwrap();
    ops.record_sale("sale-2", &[LineItem::new(PRODUCT_A, OUTLET, 12)])
        .await
        .unwrap();
    ops.revert(SourceType::Sale, "sale-2").await.unwrap();

    let level = on_hand(&db, PRODUCT_A).await;
    assert_eq!(level, 100 - 30 + 5 - 3 - 12 + 12);

    let replayed = db
        .movements()
        .reconciled_balance(PRODUCT_A, OUTLET)
        .await
        .unwrap();
    assert_eq!(replayed, level);

    // The newest movement's running balance matches the level too.
    let history = db.movements().history(PRODUCT_A, OUTLET, 1).await.unwrap();
    assert_eq!(history[0].balance_after, level);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_sales_never_double_apply() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 100).await;

    let ops_one = db.operations();
    let ops_two = db.operations();

    let items_one = [LineItem::new(PRODUCT_A, OUTLET, 60)];
    let items_two = [LineItem::new(PRODUCT_A, OUTLET, 60)];
    let (first, second) = tokio::join!(
        ops_one.record_sale("sale-1", &items_one),
        ops_two.record_sale("sale-2", &items_two),
    );

    // Exactly one commits; the other sees the committed level and fails the
    // non-negativity rule. The level is never negative and never 100 - 120.
    let outcomes = [first, second];
    let committed = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);

    let rejected = outcomes.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        unwrap_ledger_err(rejected),
        LedgerError::InsufficientStock {
            requested: 60,
            available: 40,
            ..
        }
    ));

    assert_eq!(on_hand(&db, PRODUCT_A).await, 40);
    let replayed = db
        .movements()
        .reconciled_balance(PRODUCT_A, OUTLET)
        .await
        .unwrap();
    assert_eq!(replayed, 40);
}

// =============================================================================
// Advisory thresholds
// =============================================================================

#[tokio::test]
async fn minimum_threshold_feeds_low_stock_report_without_blocking() {
    let db = fresh_db().await;
    seed_stock(&db, PRODUCT_A, 20).await;
    seed_stock(&db, PRODUCT_B, 50).await;

    db.levels()
        .set_minimum_threshold(PRODUCT_A, OUTLET, 15)
        .await
        .unwrap();

    assert!(db.levels().below_minimum(OUTLET).await.unwrap().is_empty());

    // Selling below the threshold is allowed; it only flags the report.
    db.operations()
        .record_sale("sale-1", &[LineItem::new(PRODUCT_A, OUTLET, 10)])
        .await
        .unwrap();

    let low = db.levels().below_minimum(OUTLET).await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].product_id, PRODUCT_A);
    assert!(low[0].is_below_minimum());
}

#[tokio::test]
async fn threshold_on_unknown_level_fails() {
    let db = fresh_db().await;

    let err = db
        .levels()
        .set_minimum_threshold(PRODUCT_A, OUTLET, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, tally_db::DbError::NotFound { .. }));
}
