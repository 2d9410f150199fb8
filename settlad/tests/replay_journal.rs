//! Journal replay end to end.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use settla_domain::{Address, Event, Role, SwapperKind, SwapperRef};
use settla_exec::CreateTrade;
use settlad::{run_journal, Call, Config, DaemonError, Operation, Replayer};

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

const GOVERNOR: u64 = 0x01;
const STRATEGY: u64 = 0x10;
const MECHANIC: u64 = 0x20;
const EXECUTOR: u64 = 0xe0;
const STUB: u64 = 0x50;
const TOKEN_A: u64 = 0x7a;
const TOKEN_B: u64 = 0x7b;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn call(caller: u64, at: DateTime<Utc>, op: Operation) -> Call {
    Call { caller: addr(caller), at: Some(at), op }
}

fn journal() -> Vec<Call> {
    let t0 = t0();
    let mut calls = Vec::new();
    for role in [Role::StrategyAdmin, Role::SwapperAdder, Role::SwapperSetter, Role::FeeSetter] {
        calls.push(call(GOVERNOR, t0, Operation::GrantRole { role, principal: addr(GOVERNOR) }));
    }
    calls.extend([
        call(GOVERNOR, t0, Operation::GrantRole { role: Role::Strategy, principal: addr(STRATEGY) }),
        call(GOVERNOR, t0, Operation::GrantRole { role: Role::Mechanic, principal: addr(MECHANIC) }),
        call(GOVERNOR, t0, Operation::DeployStub { address: addr(STUB), rate: dec!(0.95) }),
        call(
            GOVERNOR,
            t0,
            Operation::AddSwapper { address: addr(STUB), name: Some("stub".into()), kind: SwapperKind::Sync },
        ),
        call(GOVERNOR, t0, Operation::SetMaxFee { fee: 10_000 }),
        call(GOVERNOR, t0, Operation::SetSwapperFee { swapper: addr(STUB), fee: 10_000 }),
        call(GOVERNOR, t0, Operation::Mint { token: addr(TOKEN_A), to: addr(STRATEGY), amount: 100_000_000 }),
        call(GOVERNOR, t0, Operation::Mint { token: addr(TOKEN_B), to: addr(STUB), amount: 1_000_000_000 }),
        call(
            STRATEGY,
            t0,
            Operation::Approve { token: addr(TOKEN_A), spender: addr(EXECUTOR), amount: 100_000_000 },
        ),
        call(
            STRATEGY,
            t0,
            Operation::Create(CreateTrade {
                swapper: SwapperRef::from("stub"),
                token_in: addr(TOKEN_A),
                token_out: addr(TOKEN_B),
                amount_in: 100_000_000,
                max_slippage: 10_000,
                deadline: t0 + Duration::seconds(1_800),
            }),
        ),
        call(MECHANIC, t0 + Duration::seconds(600), Operation::Execute { id: 1, fill_data: None }),
        call(MECHANIC, t0 + Duration::seconds(601), Operation::Execute { id: 1, fill_data: None }),
    ]);
    calls
}

fn to_jsonl(calls: &[Call]) -> String {
    let mut text = String::from("# settlement scenario\n\n");
    for call in calls {
        text.push_str(&serde_json::to_string(call).unwrap());
        text.push('\n');
    }
    text
}

#[tokio::test]
async fn test_replay_executes_scenario() {
    let path = std::env::temp_dir().join(format!("settla-journal-{}.jsonl", std::process::id()));
    tokio::fs::write(&path, to_jsonl(&journal())).await.unwrap();
    let config = Config { journal: Some(path.clone()), ..Config::test() };

    let (summary, events) = run_journal(&config).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(summary.applied, journal().len() - 1);
    assert_eq!(summary.rejected, 1);
    assert!(events
        .iter()
        .any(|e| e.event == Event::TradeExecuted { id: 1, received: 94_050_000 }));

    let line = settlad::event_line(events.last().unwrap());
    assert!(line.contains("\"type\":\"trade_executed\""));
}

async fn run(name: &str, text: &str) -> (settlad::ReplaySummary, Vec<Event>) {
    let path = std::env::temp_dir().join(format!("settla-{}-{}.jsonl", name, std::process::id()));
    tokio::fs::write(&path, text).await.unwrap();
    let config = Config { journal: Some(path.clone()), ..Config::test() };
    let (summary, events) = run_journal(&config).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();
    (summary, events.into_iter().map(|e| e.event).collect())
}

#[tokio::test]
async fn test_clock_comes_from_journal_not_wall_time() {
    // Deadlines long past in wall time; only the journal's own clock counts.
    let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut calls = journal();
    for call in &mut calls {
        call.at = None;
        if let Operation::Create(request) = &mut call.op {
            request.deadline = t0 + Duration::seconds(1_800);
        }
    }
    if let Some(last) = calls.last_mut() {
        last.at = Some(t0 + Duration::seconds(600));
    }
    let text = to_jsonl(&calls);

    let (first, first_events) = run("clock-a", &text).await;
    let (second, second_events) = run("clock-b", &text).await;

    assert_eq!(first, second);
    assert_eq!(first_events, second_events);
    assert_eq!(first.rejected, 1);
    assert!(first_events.contains(&Event::TradeExecuted { id: 1, received: 94_050_000 }));
}

#[test]
fn test_replay_is_deterministic() {
    let text = to_jsonl(&journal());
    let first = Replayer::new(&Config::test(), t0()).unwrap();
    let second = Replayer::new(&Config::test(), t0()).unwrap();
    first.replay(&text).unwrap();
    second.replay(&text).unwrap();

    let events = |r: &Replayer| -> Vec<Event> { r.events_after(0).unwrap().into_iter().map(|e| e.event).collect() };
    assert_eq!(events(&first), events(&second));
}

#[test]
fn test_malformed_line_aborts_with_line_number() {
    let replayer = Replayer::new(&Config::test(), t0()).unwrap();
    let text = "# header\n{\"caller\":\"0x01\",\"op\":\"cancel_all_pending\"}\n";
    let result = replayer.replay(text);
    assert!(matches!(result, Err(DaemonError::Replay { line: 2, .. })));
}

#[test]
fn test_otc_provider_from_config() {
    let replayer = Replayer::new(&Config::test(), t0()).unwrap();
    assert_eq!(replayer.pool().provider().unwrap(), addr(0x30));
    assert!(replayer.factory().has_role(Role::Governor, addr(GOVERNOR)).unwrap());
}
