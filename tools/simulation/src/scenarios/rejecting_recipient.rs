//! Rejecting recipient
//!
//! Withdraw to addresses that refuse the transfer and confirm the vault
//! rolls back cleanly and emits nothing.

use custody::{CustodyConfig, CustodyError, TransferFailure};
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::scenarios::{deploy, Checks, ScenarioResult};

const NAME: &str = "rejecting_recipient";
const OWNER: Address = Address::repeat(0xf0);
const REJECTER: Address = Address::repeat(0xf1);
const TOKEN: TokenId = TokenId::new(Address::repeat(0xf7));

pub fn run(config: &CustodyConfig) -> ScenarioResult {
    let mut checks = Checks::new();
    let mut vault = match deploy(OWNER, config) {
        Ok(vault) => vault,
        Err(e) => return ScenarioResult::failed(NAME, format!("deploy: {e}")),
    };
    let holder = vault.address();

    vault.native_mut().mark_rejecting(REJECTER);
    checks.expect_ok(vault.deposit_native(OWNER, Amount::new(25)), "deposit 25");
    checks.expect_ok(
        vault.ledger_mut().mint(TOKEN, holder, Amount::new(40)),
        "mint 40",
    );
    vault.ledger_mut().freeze(TOKEN, REJECTER);
    let events_before = vault.events().len();

    let rejected = CustodyError::TransferRejected {
        reason: TransferFailure::Rejected { recipient: REJECTER },
    };
    checks.expect_err(
        vault.withdraw_native(&OWNER, REJECTER),
        rejected.clone(),
        "native to rejecting recipient",
    );
    checks.expect(vault.native_balance() == Amount::new(25), "native balance restored");
    checks.expect_err(
        vault.withdraw_token(&OWNER, TOKEN, REJECTER, Amount::new(10)),
        rejected,
        "token to frozen recipient",
    );
    checks.expect(vault.token_balance(&TOKEN) == Amount::new(40), "token balance untouched");
    checks.expect(vault.events().len() == events_before, "no events for failed withdrawals");

    checks.expect_ok(vault.withdraw_native(&OWNER, OWNER), "native to owner");
    checks.expect(vault.native_balance().is_zero(), "drained after rollback");

    let details = format!(
        "Two rejected withdrawals rolled back; {} native paid to owner",
        vault.native().balance_of(&OWNER)
    );
    checks.finish(NAME, &vault, details)
}
