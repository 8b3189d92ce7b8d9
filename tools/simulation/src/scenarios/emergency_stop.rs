//! Emergency stop
//!
//! Halt a funded vault, confirm both extractions are blocked while
//! deposits keep flowing, then resume and drain.

use custody::{CustodyConfig, CustodyError};
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::scenarios::{deploy, Checks, ScenarioResult};

const NAME: &str = "emergency_stop";
const OWNER: Address = Address::repeat(0xe0);
const DEPOSITOR: Address = Address::repeat(0xe1);
const TOKEN: TokenId = TokenId::new(Address::repeat(0xe7));

pub fn run(config: &CustodyConfig) -> ScenarioResult {
    let mut checks = Checks::new();
    let mut vault = match deploy(OWNER, config) {
        Ok(vault) => vault,
        Err(e) => return ScenarioResult::failed(NAME, format!("deploy: {e}")),
    };
    let holder = vault.address();

    checks.expect_ok(vault.deposit_native(DEPOSITOR, Amount::new(10)), "deposit 10");
    checks.expect_ok(
        vault.ledger_mut().mint(TOKEN, holder, Amount::new(100)),
        "mint 100",
    );

    checks.expect_ok(vault.pause(&OWNER), "pause");
    checks.expect(vault.paused(), "paused after pause");
    checks.expect_err(
        vault.withdraw_native(&OWNER, OWNER),
        CustodyError::Halted,
        "native withdrawal while halted",
    );
    checks.expect_err(
        vault.withdraw_token(&OWNER, TOKEN, OWNER, Amount::new(1)),
        CustodyError::Halted,
        "token withdrawal while halted",
    );
    checks.expect_ok(
        vault.deposit_native(DEPOSITOR, Amount::new(5)),
        "deposit while halted",
    );
    checks.expect_err(vault.pause(&OWNER), CustodyError::AlreadyHalted, "second pause");
    checks.expect_err(
        vault.resume(&DEPOSITOR),
        CustodyError::Unauthorized { caller: DEPOSITOR },
        "resume by non-owner",
    );
    checks.expect(vault.native_balance() == Amount::new(15), "halt kept native intact");
    checks.expect(vault.token_balance(&TOKEN) == Amount::new(100), "halt kept tokens intact");

    checks.expect_ok(vault.resume(&OWNER), "resume");
    checks.expect_err(vault.resume(&OWNER), CustodyError::NotHalted, "second resume");
    checks.expect_ok(vault.withdraw_native(&OWNER, OWNER), "drain native");
    checks.expect_ok(
        vault.withdraw_token(&OWNER, TOKEN, OWNER, Amount::new(100)),
        "drain tokens",
    );
    checks.expect(
        vault.native().balance_of(&OWNER) == Amount::new(15),
        "owner received 15 native",
    );

    let details = format!(
        "Halted with 15 native and 100 tokens held; {} events after resume and drain",
        vault.events().len()
    );
    checks.finish(NAME, &vault, details)
}
