use proptest::prelude::*;
use proptest::test_runner::FileFailurePersistence;

use peet::{
    ledger::{AccountId, CallContext, Ledger, MemoryStore, metadata::FACTOR},
    test_utils::{AUTHORITY, account, new_memory_ledger},
};

const CAP: u64 = 100_000 * FACTOR;

#[derive(Debug, Clone)]
enum Op {
    Deploy,
    Mint { signer: usize, amount: i64 },
    Transfer {
        signer: usize,
        from: usize,
        to: usize,
        amount: i64,
    },
}

fn accounts() -> [AccountId; 4] {
    [AUTHORITY, account(1), account(2), account(3)]
}

fn gen_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Deploy),
        2 => (0..4usize, -2..60_000i64).prop_map(|(signer, amount)| Op::Mint { signer, amount }),
        6 => (0..4usize, 0..4usize, 0..4usize, -2..(20_000 * FACTOR as i64)).prop_map(
            |(signer, from, to, amount)| Op::Transfer {
                signer,
                from,
                to,
                amount,
            }
        ),
    ]
}

async fn check_invariants(ledger: &Ledger<MemoryStore>) {
    let supply = ledger.total_supply().await.unwrap();
    let sum: u64 = ledger.store().balances().values().sum();
    assert_eq!(supply, sum, "supply must equal the sum of balances");
    assert!(supply <= CAP, "supply {} above cap", supply);
    assert!(ledger.store().balances().values().all(|b| *b > 0));
    assert!(!ledger.store().in_transaction());
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: Some(Box::new(
            FileFailurePersistence::WithSource("regressions"),
        )),
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn test_ledger_invariants(ops in prop::collection::vec(gen_op(), 1..40)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let accounts = accounts();
            let mut ledger = new_memory_ledger();
            for op in ops {
                match op {
                    Op::Deploy => {
                        let deployed = ledger.total_supply().await.unwrap() != 0;
                        let accepted = ledger.deploy().await.unwrap().is_accepted();
                        assert_eq!(accepted, !deployed);
                    }
                    Op::Mint { signer, amount } => {
                        let ctx = CallContext::signed_by(accounts[signer]);
                        let before = ledger.total_supply().await.unwrap();
                        match ledger.mint(&ctx, amount).await {
                            Ok(outcome) if outcome.is_accepted() => {
                                assert_eq!(accounts[signer], AUTHORITY);
                                assert_eq!(
                                    ledger.total_supply().await.unwrap(),
                                    before + amount as u64 * FACTOR
                                );
                            }
                            Ok(_) => {
                                assert_ne!(accounts[signer], AUTHORITY);
                                assert_eq!(ledger.total_supply().await.unwrap(), before);
                            }
                            Err(_) => {
                                assert!(amount < 0 || before + amount as u64 * FACTOR > CAP);
                                assert_eq!(ledger.total_supply().await.unwrap(), before);
                            }
                        }
                    }
                    Op::Transfer { signer, from, to, amount } => {
                        let ctx = CallContext::signed_by(accounts[signer]);
                        let (from, to) = (accounts[from], accounts[to]);
                        let from_before = ledger.balance_of(&from).await.unwrap();
                        let to_before = ledger.balance_of(&to).await.unwrap();
                        let result = ledger.transfer(&ctx, &from, &to, amount).await;
                        if amount <= 0 {
                            assert!(result.is_err());
                        }
                        let from_after = ledger.balance_of(&from).await.unwrap();
                        let to_after = ledger.balance_of(&to).await.unwrap();
                        if from != to {
                            assert_eq!(from_before + to_before, from_after + to_after);
                        } else {
                            assert_eq!(from_before, from_after);
                        }
                        if let Ok(outcome) = result {
                            if outcome.is_accepted() && from != to {
                                assert_eq!(from_after, from_before - amount as u64);
                            }
                        }
                    }
                }
                check_invariants(&ledger).await;
            }
        });
    }
}
