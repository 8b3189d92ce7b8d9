//! Ownership handoff
//!
//! Hand the vault from P to Q and confirm every privilege moves with it.
//! Finishes by trying to renounce to the zero address, which either fails
//! or locks the vault for good depending on configuration.

use custody::{CustodyConfig, CustodyError};
use types::ids::Address;
use types::numeric::Amount;

use crate::scenarios::{deploy, Checks, ScenarioResult};

const NAME: &str = "ownership_handoff";
const P: Address = Address::repeat(0x01);
const Q: Address = Address::repeat(0x02);

pub fn run(config: &CustodyConfig) -> ScenarioResult {
    let mut checks = Checks::new();
    let mut vault = match deploy(P, config) {
        Ok(vault) => vault,
        Err(e) => return ScenarioResult::failed(NAME, format!("deploy: {e}")),
    };

    checks.expect_ok(vault.deposit_native(Q, Amount::new(3)), "deposit");
    checks.expect_err(
        vault.transfer_ownership(&Q, Q),
        CustodyError::Unauthorized { caller: Q },
        "Q cannot seize ownership",
    );
    checks.expect_ok(vault.transfer_ownership(&P, Q), "P hands over to Q");
    checks.expect(vault.owner() == Q, "Q owns the vault");

    checks.expect_err(
        vault.withdraw_native(&P, P),
        CustodyError::Unauthorized { caller: P },
        "P lost withdrawal rights",
    );
    checks.expect_err(
        vault.pause(&P),
        CustodyError::Unauthorized { caller: P },
        "P lost pause rights",
    );

    // Ownership can move while halted
    checks.expect_ok(vault.pause(&Q), "Q pauses");
    checks.expect_ok(vault.transfer_ownership(&Q, P), "Q hands back while halted");
    checks.expect_ok(vault.transfer_ownership(&P, Q), "P hands over again");
    checks.expect_ok(vault.resume(&Q), "Q resumes");
    checks.expect_ok(vault.withdraw_native(&Q, Q), "Q withdraws");

    let renounce = vault.transfer_ownership(&Q, Address::ZERO);
    if config.allow_zero_owner {
        checks.expect_ok(renounce, "renounce to zero");
        checks.expect_err(
            vault.pause(&Q),
            CustodyError::Unauthorized { caller: Q },
            "nobody owns a renounced vault",
        );
    } else {
        checks.expect_err(renounce, CustodyError::ZeroAddress, "renounce refused");
        checks.expect(vault.owner() == Q, "Q still owns after refused renounce");
    }

    let details = format!("Final owner {}", vault.owner());
    checks.finish(NAME, &vault, details)
}
