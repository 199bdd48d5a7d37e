use proptest::prelude::*;
use rust_decimal::Decimal;
use wallet_ledger::application::orchestrator::BillPaymentOrder;
use wallet_ledger::domain::page::PageRequest;
use wallet_ledger::domain::transaction::{TransactionStatus, TransactionType};
use wallet_ledger::domain::wallet::OwnerId;
use wallet_ledger::infrastructure::mock_gateway::{MockBehavior, MockGateway};

mod common;
use common::{amount, ledger};

#[derive(Debug, Clone)]
enum Step {
    Fund(u32),
    PayBill(u32, MockBehavior),
    Replay,
}

fn behavior() -> impl Strategy<Value = MockBehavior> {
    prop_oneof![
        3 => Just(MockBehavior::Succeed),
        1 => Just(MockBehavior::Reject),
        1 => Just(MockBehavior::Unavailable),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1u32..5_000).prop_map(Step::Fund),
        (1u32..5_000, behavior()).prop_map(|(value, b)| Step::PayBill(value, b)),
        Just(Step::Replay),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Balance always equals successful fundings minus successful bills, and
    /// never goes negative, whatever the gateway answers.
    #[test]
    fn balance_matches_settled_transactions(steps in prop::collection::vec(step(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let ledger = ledger(MockGateway::new());
            let owner = OwnerId::new("prop");
            let mut last_reference: Option<String> = None;

            for (i, step) in steps.iter().enumerate() {
                match step {
                    Step::Fund(value) => {
                        let reference = format!("FUND-{}", i);
                        let _ = ledger
                            .engine
                            .fund(&owner, amount(Decimal::from(*value)), &reference)
                            .await;
                        last_reference = Some(reference);
                    }
                    Step::PayBill(value, behavior) => {
                        ledger.gateway.set_bills(*behavior).await;
                        let reference = format!("BILL-{}", i);
                        let _ = ledger
                            .engine
                            .pay_bill(
                                BillPaymentOrder::new(
                                    owner.clone(),
                                    amount(Decimal::from(*value)),
                                    "METER-1",
                                    "provider-A",
                                )
                                .with_reference(reference.clone()),
                            )
                            .await;
                        last_reference = Some(reference);
                    }
                    Step::Replay => {
                        if let Some(reference) = &last_reference
                            && let Ok(before) = ledger.engine.transaction(reference).await
                        {
                            let _ = ledger.engine.fund(&owner, before.amount, reference).await;
                            let after = ledger.engine.transaction(reference).await.unwrap();
                            prop_assert_eq!(before, after);
                        }
                    }
                }
            }

            let balance = match ledger.engine.get_balance(&owner).await {
                Ok(balance) => balance.value(),
                // Only bills were attempted and no wallet was ever created.
                Err(_) => Decimal::ZERO,
            };
            prop_assert!(balance >= Decimal::ZERO);

            let items = page_items(&ledger, &owner).await;
            let expected: Decimal = items
                .iter()
                .filter(|tx| tx.status == TransactionStatus::Success)
                .map(|tx| match tx.kind {
                    TransactionType::FundWallet => tx.amount.value(),
                    _ => -tx.amount.value(),
                })
                .sum();
            prop_assert_eq!(balance, expected);

            // No gateway answer here leaves a transaction unresolved.
            for tx in &items {
                prop_assert_ne!(tx.status, TransactionStatus::Pending);
            }
            Ok(())
        })?;
    }
}

async fn page_items(
    ledger: &common::TestLedger,
    owner: &OwnerId,
) -> Vec<wallet_ledger::domain::transaction::Transaction> {
    ledger
        .engine
        .transactions_for_owner(owner, PageRequest::new(1, 100).unwrap())
        .await
        .map(|page| page.items)
        .unwrap_or_default()
}
