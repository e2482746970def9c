//! Margin Protocol Client Simulation.
//!
//! Drives the client facade against the in-memory contract: opening, rights transfers,
//! margin calls, closing and the event history that falls out of it.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use margin_client::*;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

const START: u64 = 1_700_000_000;

type Client = Margin<SimulatedMargin>;

#[tokio::main]
async fn main() -> Result<(), MarginError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Margin Protocol Client Simulation");
    println!("In-Memory Contract, Full Position Lifecycle\n");

    scenario_1_open_and_read().await?;
    scenario_2_argument_checks().await?;
    scenario_3_rights_transfers().await?;
    scenario_4_margin_call().await?;
    scenario_5_close_and_history().await?;
    scenario_6_loan_offering().await?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn party(n: u8) -> Address {
    Address::repeat_byte(n)
}

fn client() -> (Arc<SimulatedMargin>, Client) {
    let sim = Arc::new(SimulatedMargin::new(party(0x4d), START));
    let margin = Margin::new(Arc::clone(&sim), MarginConfig::development(sim.address()));
    (sim, margin)
}

async fn open(margin: &Client, nonce: u64) -> Result<PositionId, MarginError> {
    let receipt = margin
        .open_without_counterparty(
            party(1),
            party(2),
            party(3),
            party(0xa1),
            party(0xa2),
            U256::from(nonce),
            U256::from(1_000u64),
            U256::from(500u64),
            3_600,
            86_400,
            dec!(2),
            3_600,
            CallOptions::new(),
        )
        .await?;
    Ok(receipt.position_id.unwrap_or_else(|| margin.get_position_id(party(1), U256::from(nonce))))
}

/// Open without a counterparty and read the stored record back.
async fn scenario_1_open_and_read() -> Result<(), MarginError> {
    println!("Scenario 1: Open and Read Back\n");

    let (_, margin) = client();
    let id = open(&margin, 1).await?;
    let position = margin.get_position(id).await?;

    println!("  Position id: {id}");
    println!("  Owner {} borrows {} from lender {}", position.owner, position.principal, position.lender);
    println!("  Interest rate {} per {}s period", position.interest_rate, position.interest_period);
    println!("  Status: {:?}\n", margin.get_position_status(id).await?);
    Ok(())
}

/// Malformed opens are rejected by the contract, never by the client.
async fn scenario_2_argument_checks() -> Result<(), MarginError> {
    println!("Scenario 2: Contract Side Argument Checks\n");

    let (_, margin) = client();
    open(&margin, 1).await?;

    match open(&margin, 1).await {
        Err(err) => println!("  Reused nonce: {}", err.revert_reason().unwrap_or("no reason")),
        Ok(_) => println!("  Reused nonce unexpectedly accepted"),
    }

    let same_tokens = margin
        .open_without_counterparty(
            party(1),
            party(2),
            party(3),
            party(0xa1),
            party(0xa1),
            U256::from(2u64),
            U256::ZERO,
            U256::from(10u64),
            0,
            100,
            dec!(0),
            10,
            CallOptions::new(),
        )
        .await;
    if let Err(err) = same_tokens {
        println!("  Owed token equals held token: {}", err.revert_reason().unwrap_or("no reason"));
    }

    let fresh = open(&margin, 2).await?;
    println!("  Fresh nonce opens {fresh}\n");
    Ok(())
}

/// Loan and position rights move independently.
async fn scenario_3_rights_transfers() -> Result<(), MarginError> {
    println!("Scenario 3: Rights Transfers\n");

    let (_, margin) = client();
    let id = open(&margin, 1).await?;

    margin.transfer_position(id, party(4), party(2), CallOptions::new()).await?;
    margin.transfer_loan(id, party(5), party(3), CallOptions::new()).await?;

    let position = margin.get_position(id).await?;
    println!("  Owner now {}", position.owner);
    println!("  Lender now {}\n", position.lender);
    Ok(())
}

/// Lender calls, owner cures with a deposit.
async fn scenario_4_margin_call() -> Result<(), MarginError> {
    println!("Scenario 4: Margin Call and Cure\n");

    let (sim, margin) = client();
    let id = open(&margin, 1).await?;

    margin.margin_call(id, U256::from(250u64), party(3), CallOptions::new()).await?;
    println!("  After call: {:?}", margin.get_position_status(id).await?);

    sim.advance_time(1_800).await;
    margin.deposit_collateral(id, U256::from(250u64), party(2), CallOptions::new()).await?;
    println!("  After deposit: {:?}", margin.get_position_status(id).await?);
    println!("  Balance: {}\n", margin.get_position_balance(id).await?);
    Ok(())
}

/// Two partial closes, then the history read joined with block times.
async fn scenario_5_close_and_history() -> Result<(), MarginError> {
    println!("Scenario 5: Close and Event History\n");

    let (sim, margin) = client();
    let id = open(&margin, 1).await?;

    for amount in [200u64, 300] {
        sim.advance_time(600).await;
        margin
            .close_position_directly(id, party(2), party(2), U256::from(amount), CallOptions::new())
            .await?;
    }

    for event in margin.get_all_position_closed_events(id).await? {
        println!(
            "  Block {} at {}: closed {}, remaining {}",
            event.block_number, event.timestamp, event.args.close_amount, event.args.remaining_amount
        );
    }
    println!("  Repaid to lender: {}", margin.get_total_owed_token_repaid_to_lender(id).await?);
    println!("  Status: {:?}\n", margin.get_position_status(id).await?);
    Ok(())
}

/// Open against a signed offering, then burn part of its remaining capacity.
async fn scenario_6_loan_offering() -> Result<(), MarginError> {
    println!("Scenario 6: Signed Loan Offering\n");

    let (_, margin) = client();
    let offering = LoanOffering {
        owed_token: party(0xa1),
        held_token: party(0xa2),
        payer: party(3),
        owner: party(3),
        taker: Address::ZERO,
        position_owner: Address::ZERO,
        fee_recipient: Address::ZERO,
        lender_fee_token_address: Address::ZERO,
        taker_fee_token_address: Address::ZERO,
        max_amount: U256::from(1_000u64),
        min_amount: U256::from(1u64),
        min_held_token: U256::ZERO,
        lender_fee: U256::ZERO,
        taker_fee: U256::ZERO,
        expiration_timestamp: U256::from(START + 86_400),
        salt: U256::from(7u64),
        call_time_limit: 3_600,
        max_duration: 86_400,
        interest_rate: dec!(1.5),
        interest_period: 3_600,
        signature: Bytes::from(vec![0x1c; 65]),
    };

    let Some(signed) = SignedLoanOffering::new(offering.clone()) else {
        println!("  Offering is unsigned, skipping\n");
        return Ok(());
    };

    let receipt = margin
        .open_position(
            &signed,
            party(1),
            party(2),
            U256::from(400u64),
            U256::from(100u64),
            U256::from(1u64),
            true,
            &party(0xee),
            Bytes::new(),
            CallOptions::new(),
        )
        .await?;
    println!("  Opened in block {}", receipt.block_number);

    margin.cancel_loan_offer(&offering, U256::from(100u64), party(3), CallOptions::new()).await?;

    if let Some(hash) = SimulatedMargin::loan_hash_of(&offering) {
        println!("  Filled: {}", margin.get_loan_filled_amount(hash).await?);
        println!("  Canceled: {}", margin.get_loan_canceled_amount(hash).await?);
        println!("  Unavailable: {}\n", margin.get_loan_unavailable_amount(hash).await?);
    }
    Ok(())
}
