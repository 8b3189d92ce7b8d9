//! Deployment walkthrough
//!
//! Deploy a vault and a token ledger, fund the vault with 1000 tokens,
//! pull 500 back out, then round-trip 50 units of native currency.

use custody::{CustodyConfig, CustodyVault, FungibleLedger, NativeBank, TokenLedger};
use types::ids::{Address, TokenId};
use types::numeric::Amount;

use crate::scenarios::{Checks, ScenarioResult};

const NAME: &str = "deploy_walkthrough";
const DEPLOYER: Address = Address::repeat(0xd0);

pub fn run(config: &CustodyConfig) -> ScenarioResult {
    let mut checks = Checks::new();
    let decimals = config.native_decimals;
    let units = |value: &str| Amount::parse_units(value, decimals).unwrap_or(Amount::ZERO);

    let mut vault = match CustodyVault::deploy(
        DEPLOYER,
        0,
        NativeBank::new(),
        TokenLedger::new(),
        config.clone(),
    ) {
        Ok(vault) => vault,
        Err(e) => return ScenarioResult::failed(NAME, format!("deploy: {e}")),
    };

    // The token ledger is the deployer's next deployment.
    let token = TokenId::new(Address::derive(&DEPLOYER, 1));
    let vault_address = vault.address();
    checks.expect(
        vault_address == Address::derive(&DEPLOYER, 0),
        "vault address derived from nonce 0",
    );

    checks.expect_ok(
        vault.native_mut().credit(DEPLOYER, units("100")),
        "fund deployer",
    );
    checks.expect_ok(
        vault.ledger_mut().mint(token, vault_address, units("1000")),
        "mint 1000 to vault",
    );
    checks.expect(vault.token_balance(&token) == units("1000"), "vault holds 1000 tokens");

    checks.expect_ok(
        vault.withdraw_token(&DEPLOYER, token, DEPLOYER, units("500")),
        "withdraw 500 tokens",
    );
    checks.expect(vault.token_balance(&token) == units("500"), "vault keeps 500 tokens");
    checks.expect(
        vault.ledger().balance_of(&DEPLOYER, &token) == units("500"),
        "deployer received 500 tokens",
    );

    checks.expect_ok(
        vault.native_mut().debit(&DEPLOYER, units("50")),
        "deployer pays 50",
    );
    checks.expect_ok(vault.deposit_native(DEPLOYER, units("50")), "deposit 50");
    checks.expect(vault.native_balance() == units("50"), "vault holds 50 native");

    checks.expect_ok(vault.withdraw_native(&DEPLOYER, DEPLOYER), "withdraw native");
    checks.expect(vault.native_balance().is_zero(), "vault drained");
    checks.expect(
        vault.native().balance_of(&DEPLOYER) == units("100"),
        "deployer back to 100 native",
    );

    let details = format!(
        "Vault {} holds {} of token {}; native drained back to {}",
        vault_address,
        vault.token_balance(&token),
        token,
        DEPLOYER
    );
    checks.finish(NAME, &vault, details)
}
