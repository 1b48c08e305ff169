use bigdecimal::{BigDecimal, Zero};

use teller::loan::{LoanStatus, NewLoan, Repo};
use teller::store;
use teller::Id;

use crate::common::{Fixture, Suite};

#[test]
fn create_loan() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);
	let bob = suite.bob();

	let principal = BigDecimal::from(1000);
	let loan = suite
		.loan_repo
		.create(NewLoan {
			account_id: &bob.id,
			principal: &principal,
		})
		.unwrap();

	assert_eq!(loan.account_id, bob.id);
	assert_eq!(loan.principal, principal);
	assert_eq!(loan.balance, principal);
	assert_eq!(loan.status, LoanStatus::Active);

	let got = suite.loan_repo.find_for_account(&bob.id);
	assert_eq!(got, vec![loan]);
}

#[test]
fn find_missing_loan_err() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);
	let err = suite.loan_repo.find_by_id(&Id::new_v4()).unwrap_err();
	assert_eq!(err, store::Error::RecordNotFound);
}

#[test]
fn payments_survive_reopen() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);
	let bob = suite.bob();

	let loan = suite
		.loan_repo
		.create(NewLoan {
			account_id: &bob.id,
			principal: &BigDecimal::from(500),
		})
		.unwrap();

	suite.loan_repo.decrement(&loan.id, &BigDecimal::from(500)).unwrap();
	suite.loan_repo.set_status(&loan.id, LoanStatus::PaidOff).unwrap();

	let reopened = Repo::open(f.config.loans_file()).unwrap();
	let got = reopened.find_by_id(&loan.id).unwrap();
	assert!(got.balance.is_zero());
	assert_eq!(got.status, LoanStatus::PaidOff);
	// the principal never changes, only the outstanding balance does
	assert_eq!(got.principal, BigDecimal::from(500));
}
