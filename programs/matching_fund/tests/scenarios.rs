//! End-to-end fund lifecycles driven against the in-memory ledger.

use anchor_lang::prelude::Pubkey;
use tandem_common::authority::SingleOwner;
use tandem_common::ledger::{MemoryLedger, TokenLedger};
use tandem_common::testing::error_name;
use tandem_matching_fund::state::MatchingFund;
use tandem_matching_fund::InitFundArgs;

const HOUR: i64 = 60 * 60;
const OPENED_AT: i64 = 1_700_000_000;

struct World {
    fund: MatchingFund,
    ledger: MemoryLedger,
    owner: Pubkey,
    donor: Pubkey,
    recipient: Pubkey,
}

impl World {
    fn new(minimum_contribution: u64) -> Self {
        let owner = Pubkey::new_unique();
        let donor = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let args = InitFundArgs {
            minimum_contribution,
            matching_window: HOUR,
            donors: vec![donor],
            recipients: vec![recipient],
        };
        let fund = MatchingFund::try_from_args(
            &owner,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &args,
            OPENED_AT,
        )
        .unwrap();
        Self {
            fund,
            ledger: MemoryLedger::new(),
            owner,
            donor,
            recipient,
        }
    }

    fn wallet(&mut self, balance: u64) -> Pubkey {
        let wallet = Pubkey::new_unique();
        self.ledger.mint(&wallet, balance);
        wallet
    }

    fn approve(&mut self, owner: &Pubkey, amount: u64) {
        let spender = self.fund.vault_authority;
        self.ledger.approve(owner, &spender, amount);
    }

    fn balance(&self, owner: &Pubkey) -> u64 {
        self.ledger.balance_of(owner).unwrap()
    }

    fn pool(&self) -> u64 {
        self.fund.pool_balance(&self.ledger).unwrap()
    }
}

#[test]
fn single_funder_matches_until_exhausted() {
    let mut world = World::new(1);
    let lp = world.wallet(1_000);
    world.approve(&lp, 75);
    world.fund.add_funds(&lp, 75, &mut world.ledger).unwrap();
    assert_eq!(world.pool(), 75);

    let donor = world.donor;
    let recipient = world.recipient;
    world.ledger.mint(&donor, 1_000);
    world.approve(&donor, 50);
    world
        .fund
        .donate(&donor, &recipient, 50, OPENED_AT + 10, &mut world.ledger)
        .unwrap();
    assert_eq!(world.balance(&recipient), 100);
    assert_eq!(world.pool(), 25);

    world.approve(&donor, 50);
    let err = world
        .fund
        .donate(&donor, &recipient, 50, OPENED_AT + 20, &mut world.ledger)
        .unwrap_err();
    assert_eq!(error_name(&err), "InsufficientMatchingFunds");
    assert_eq!(world.balance(&recipient), 100);
    assert_eq!(world.balance(&donor), 950);
}

#[test]
fn unlisted_donor_consumes_no_allowance() {
    let mut world = World::new(1);
    let lp = world.wallet(100);
    world.approve(&lp, 100);
    world.fund.add_funds(&lp, 100, &mut world.ledger).unwrap();

    let stranger = world.wallet(100);
    world.approve(&stranger, 100);
    let recipient = world.recipient;
    let err = world
        .fund
        .donate(&stranger, &recipient, 50, OPENED_AT, &mut world.ledger)
        .unwrap_err();
    assert_eq!(error_name(&err), "DonorNotAllowed");
    assert_eq!(
        world.ledger.allowance(&stranger, &world.fund.vault_authority),
        100
    );
    assert_eq!(world.pool(), 100);
}

#[test]
fn minimum_gates_new_lps_only() {
    let mut world = World::new(100);
    let lp = world.wallet(1_000);
    world.approve(&lp, 1_000);

    let err = world.fund.add_funds(&lp, 50, &mut world.ledger).unwrap_err();
    assert_eq!(error_name(&err), "BelowMinimumContribution");

    world.fund.add_funds(&lp, 100, &mut world.ledger).unwrap();
    world.fund.add_funds(&lp, 50, &mut world.ledger).unwrap();
    assert_eq!(world.fund.contribution_of(&lp), 150);
}

#[test]
fn multi_lp_fund_refunds_ninety_percent_after_ten_percent_used() {
    let mut world = World::new(1);
    let owner = world.owner;
    let donor = world.donor;
    let recipient = world.recipient;

    let mut lps = Vec::new();
    for amount in [400u64, 100, 200, 300] {
        let lp = world.wallet(1_000);
        world.approve(&lp, amount);
        world.fund.add_funds(&lp, amount, &mut world.ledger).unwrap();
        lps.push(lp);
    }
    assert_eq!(world.fund.total_contributed, 1_000);
    assert_eq!(world.pool(), 1_000);

    world.ledger.mint(&donor, 100);
    world.approve(&donor, 100);
    world
        .fund
        .donate(&donor, &recipient, 100, OPENED_AT + HOUR, &mut world.ledger)
        .unwrap();
    assert_eq!(world.pool(), 900);

    let auth = SingleOwner::of(&world.fund);
    let report = world.fund.close(&owner, &auth, &mut world.ledger).unwrap();
    assert_eq!(report.closing_balance, 900);

    let balances: Vec<u64> = lps.iter().map(|lp| world.balance(lp)).collect();
    assert_eq!(balances, vec![960, 990, 980, 970]);
    assert_eq!(world.pool(), 0);

    // Closure is terminal for every mutating operation.
    let lp = lps[0];
    world.approve(&lp, 100);
    let err = world.fund.add_funds(&lp, 100, &mut world.ledger).unwrap_err();
    assert_eq!(error_name(&err), "FundClosed");
    let err = world
        .fund
        .donate(&donor, &recipient, 1, OPENED_AT + HOUR, &mut world.ledger)
        .unwrap_err();
    assert_eq!(error_name(&err), "FundClosed");
    let err = world
        .fund
        .add_donor(&owner, &auth, Pubkey::new_unique())
        .unwrap_err();
    assert_eq!(error_name(&err), "FundClosed");
    let err = world.fund.close(&owner, &auth, &mut world.ledger).unwrap_err();
    assert_eq!(error_name(&err), "FundClosed");
}

#[test]
fn owner_can_close_after_matching_window() {
    let mut world = World::new(1);
    let owner = world.owner;
    let donor = world.donor;
    let recipient = world.recipient;
    let lp = world.wallet(500);
    world.approve(&lp, 500);
    world.fund.add_funds(&lp, 500, &mut world.ledger).unwrap();

    world.ledger.mint(&donor, 10);
    world.approve(&donor, 10);
    let err = world
        .fund
        .donate(&donor, &recipient, 10, OPENED_AT + HOUR + 1, &mut world.ledger)
        .unwrap_err();
    assert_eq!(error_name(&err), "MatchingWindowElapsed");

    let auth = SingleOwner::of(&world.fund);
    world.fund.close(&owner, &auth, &mut world.ledger).unwrap();
    assert_eq!(world.balance(&lp), 500);
}

#[test]
fn whitelist_changes_take_effect_immediately() {
    let mut world = World::new(1);
    let owner = world.owner;
    let donor = world.donor;
    let lp = world.wallet(100);
    world.approve(&lp, 100);
    world.fund.add_funds(&lp, 100, &mut world.ledger).unwrap();

    let new_recipient = Pubkey::new_unique();
    world.ledger.mint(&donor, 20);
    world.approve(&donor, 20);
    let err = world
        .fund
        .donate(&donor, &new_recipient, 10, OPENED_AT, &mut world.ledger)
        .unwrap_err();
    assert_eq!(error_name(&err), "RecipientNotAllowed");

    let auth = SingleOwner::of(&world.fund);
    world.fund.add_recipient(&owner, &auth, new_recipient).unwrap();
    world
        .fund
        .donate(&donor, &new_recipient, 10, OPENED_AT, &mut world.ledger)
        .unwrap();
    assert_eq!(world.balance(&new_recipient), 20);

    world.fund.remove_donor(&owner, &auth, donor).unwrap();
    let err = world
        .fund
        .donate(&donor, &new_recipient, 10, OPENED_AT, &mut world.ledger)
        .unwrap_err();
    assert_eq!(error_name(&err), "DonorNotAllowed");
}
