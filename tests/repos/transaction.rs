use bigdecimal::BigDecimal;

use teller::transaction::{NewTransaction, Repo, Type};
use teller::Id;

use crate::common::{Fixture, Suite};

#[test]
fn ledger_survives_reopen_in_order() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);
	let account_id = Id::new_v4();

	let first = suite
		.transaction_repo
		.create(NewTransaction {
			account_id: &account_id,
			transaction_type: Type::Deposit,
			amount: &BigDecimal::from(100),
			related_account_id: None,
		})
		.unwrap();
	let second = suite
		.transaction_repo
		.create(NewTransaction {
			account_id: &account_id,
			transaction_type: Type::Withdrawal,
			amount: &BigDecimal::from(40),
			related_account_id: None,
		})
		.unwrap();

	let reopened = Repo::open(f.config.transactions_file());
	let got = reopened.find_for_account(&account_id).unwrap();
	assert_eq!(got, vec![first, second]);
}

#[test]
fn transfer_legs_reference_each_other() {
	let f = Fixture::new();
	let suite = Suite::setup(&f);
	let sender = Id::new_v4();
	let receiver = Id::new_v4();
	let amount = BigDecimal::from(75);

	suite
		.transaction_repo
		.create(NewTransaction {
			account_id: &sender,
			transaction_type: Type::TransferOut,
			amount: &amount,
			related_account_id: Some(&receiver),
		})
		.unwrap();
	suite
		.transaction_repo
		.create(NewTransaction {
			account_id: &receiver,
			transaction_type: Type::TransferIn,
			amount: &amount,
			related_account_id: Some(&sender),
		})
		.unwrap();

	let out = suite.transaction_repo.find_for_account(&sender).unwrap();
	assert_eq!(out[0].related_account_id, Some(receiver));
	let into = suite.transaction_repo.find_for_account(&receiver).unwrap();
	assert_eq!(into[0].related_account_id, Some(sender));
}
