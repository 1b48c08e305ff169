use bigdecimal::{BigDecimal, Zero};

use teller::account::{AccountStatus, Repo};
use teller::store;

use crate::common::{Fixture, Suite, TestUsers};

#[test]
fn create_account() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);

	let want = suite.bob();
	assert_eq!(want.owner_name, TestUsers::NAME_BOB);
	assert_eq!(want.balance, BigDecimal::zero());
	assert_eq!(want.status, AccountStatus::Active);

	let got = suite.account_repo.find_by_id(&want.id).unwrap();
	assert_eq!(got, want);
}

#[test]
fn records_survive_reopen() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);

	let bob = suite.bob();
	suite.account_repo.increment(&bob.id, &BigDecimal::from(75)).unwrap();
	suite.account_repo.set_status(&bob.id, AccountStatus::Frozen).unwrap();

	let reopened = Repo::open(f.config.accounts_file()).unwrap();
	let got = reopened.find_by_id(&bob.id).unwrap();
	assert_eq!(got.balance, BigDecimal::from(75));
	assert_eq!(got.status, AccountStatus::Frozen);
}

#[test]
fn update_overwrites_whole_record() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);

	let mut bob = suite.bob();
	bob.owner_name = "Robert Roberts".to_owned();
	suite.account_repo.update(&bob).unwrap();

	let got = suite.account_repo.find_by_id(&bob.id).unwrap();
	assert_eq!(got.owner_name, "Robert Roberts");
}

#[test]
fn update_missing_record_err() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);

	let mut ghost = suite.bob();
	ghost.id = teller::Id::new_v4();
	let err = suite.account_repo.update(&ghost).unwrap_err();
	assert_eq!(err, store::Error::RecordNotFound);
}

#[test]
fn transfer_moves_both_balances_in_one_write() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);

	let bob = suite.bob();
	let lucy = suite.lucy();
	suite.account_repo.increment(&bob.id, &BigDecimal::from(400)).unwrap();

	let (from, to) = suite
		.account_repo
		.transfer(&bob.id, &lucy.id, &BigDecimal::from(150))
		.unwrap();
	assert_eq!(from.balance, BigDecimal::from(250));
	assert_eq!(to.balance, BigDecimal::from(150));

	// both legs are visible to a fresh reader of the same file
	let reopened = Repo::open(f.config.accounts_file()).unwrap();
	assert_eq!(reopened.find_by_id(&bob.id).unwrap().balance, BigDecimal::from(250));
	assert_eq!(reopened.find_by_id(&lucy.id).unwrap().balance, BigDecimal::from(150));
}

#[test]
fn list_returns_every_account() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);

	let bob = suite.bob();
	let lucy = suite.lucy();

	let got = suite.account_repo.list();
	assert_eq!(got, vec![bob, lucy]);
}
