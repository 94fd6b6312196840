use proptest::prelude::*;

use dao_divs::{DivsDistributor, FeeLedger};
use dao_token::GovernanceToken;
use dao_types::{AccountId, Timestamp, ONE_TOKEN};

fn holder(n: u8) -> AccountId {
    AccountId::new(format!("0x{:040x}", n as u64 + 1))
}

proptest! {
    /// However the supply is split and transferred, the claims of one interval
    /// never exceed its reward, and the held funds always cover what is left.
    #[test]
    fn claims_never_exceed_the_interval_reward(
        mints in prop::collection::vec((0u8..5, 1u128..1_000_000), 1..10),
        transfers in prop::collection::vec((0u8..5, 0u8..5, 1u128..1_000_000), 0..10),
        fees in 1u128..1_000_000_000_000,
    ) {
        let minter = holder(200);
        let mut token = GovernanceToken::new("DAO", u128::MAX / 2);
        token.set_minter(minter.clone()).unwrap();
        for (h, amount) in mints {
            token.mint(&minter, &holder(h), amount * ONE_TOKEN, Timestamp::new(10)).unwrap();
        }

        let mut divs = DivsDistributor::new(1_000, FeeLedger::new()).unwrap();
        divs.deposit_fees(fees).unwrap();
        divs.add_distribution_interval(Timestamp::new(100)).unwrap();

        // moves after the snapshot do not change anyone's share
        for (from, to, amount) in transfers {
            let amount = (amount * ONE_TOKEN).min(token.balance_of(&holder(from)));
            if amount > 0 {
                token.transfer(&holder(from), &holder(to), amount, Timestamp::new(150)).unwrap();
            }
        }

        let mut paid = 0u128;
        for h in 0..5 {
            paid += divs.claim_divs(&token, &holder(h), Timestamp::new(200)).unwrap();
        }
        prop_assert!(paid <= fees);
        prop_assert_eq!(divs.sink().total_paid(), paid);
        prop_assert_eq!(divs.funds(), fees - paid);
        prop_assert_eq!(divs.intervals()[0].paid, paid);
        // each share is floored once per holder
        prop_assert!(fees - paid <= 5);
    }
}
