use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use bingo_admin_back::{
    config::AppConfig,
    dao::{
        game_store::{GameStore, memory::InMemoryGameStore},
        models::{ClaimType, GameStatus},
    },
    dto::{
        claim::ValidateBingoRequest, game::CreateGameRequest,
        participant::CreateParticipantRequest, prize::CreatePrizeRequest,
    },
    error::ServiceError,
    services::{
        claim_service, draw_service, game_service, participant_service, prize_service,
        public_service,
    },
    state::{AppState, SharedState, card::Card, draw::DrawRequest},
};
use uuid::Uuid;

const FIRST_ROW: [u8; 5] = [1, 16, 31, 46, 61];

fn known_card() -> Card {
    Card::from_rows([
        FIRST_ROW,
        [2, 17, 32, 47, 62],
        [3, 18, 0, 48, 63],
        [4, 19, 33, 49, 64],
        [5, 20, 34, 50, 65],
    ])
    .unwrap()
}

async fn setup() -> (SharedState, Arc<InMemoryGameStore>) {
    let store = Arc::new(InMemoryGameStore::new());
    let state = AppState::with_store(AppConfig::default(), store.clone()).await;
    (state, store)
}

async fn create_game(state: &SharedState, name: &str) -> Uuid {
    game_service::create_game(
        state,
        CreateGameRequest {
            name: Some(name.into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .game
    .id
}

/// Register a participant, then swap the random card for [`known_card`].
async fn participant_with_known_card(
    state: &SharedState,
    store: &InMemoryGameStore,
    game_id: Uuid,
    name: &str,
) -> Uuid {
    let id = participant_service::create_participant(
        state,
        CreateParticipantRequest {
            game_id: Some(game_id),
            name: Some(name.into()),
            phone: Some("11912345678".into()),
            pix_key: Some(format!("{name}@pix")),
            email: None,
        },
    )
    .await
    .unwrap()
    .participant
    .id;

    let mut participant = store.find_participant_by_id(id).await.unwrap().unwrap();
    participant.card = known_card();
    store.save_participant(participant).await.unwrap();
    id
}

async fn draw_first_row(state: &SharedState, game_id: Uuid) {
    for number in FIRST_ROW {
        draw_service::draw_manual_number(state, game_id, DrawRequest::Manual(number.into()))
            .await
            .unwrap();
    }
}

fn claim(participant_id: Uuid, claim_type: &str) -> ValidateBingoRequest {
    ValidateBingoRequest {
        participant_id: Some(participant_id),
        claim_type: Some(claim_type.into()),
    }
}

#[tokio::test]
async fn completed_row_wins_the_line_prize_once() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Bingo da quermesse").await;
    let participant_id = participant_with_known_card(&state, &store, game_id, "ana").await;

    prize_service::create_prize(
        &state,
        CreatePrizeRequest {
            prize_type: Some("line".into()),
            title: Some("Cesta de café da manhã".into()),
            image_url: Some("https://cdn.example.com/cesta.png".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    draw_service::start_game(&state, game_id).await.unwrap();
    draw_first_row(&state, game_id).await;

    let won = claim_service::validate_claim(&state, game_id, claim(participant_id, "line"))
        .await
        .unwrap();
    assert_eq!(won.claim_type, ClaimType::Line);
    assert_eq!(won.winner, "ana");
    assert_eq!(won.prize.value, AppConfig::default().game_defaults.prize_line);
    assert_eq!(won.prize.name, "Cesta de café da manhã");
    assert_eq!(
        won.prize.image_url.as_deref(),
        Some("https://cdn.example.com/cesta.png")
    );
    assert!(won.bingo_claim.validated);

    let again = claim_service::validate_claim(&state, game_id, claim(participant_id, "line"))
        .await
        .unwrap_err();
    assert!(matches!(
        again,
        ServiceError::InvalidState(message) if message.contains("already been claimed")
    ));

    let column = claim_service::validate_claim(&state, game_id, claim(participant_id, "column"))
        .await
        .unwrap_err();
    assert!(matches!(column, ServiceError::InvalidInput(_)));

    let winner = store.find_participant_by_id(participant_id).await.unwrap().unwrap();
    assert!(winner.is_winner);
    assert_eq!(winner.winner_type, Some(ClaimType::Line));

    let history = public_service::get_history(&state, game_id).await.unwrap();
    assert_eq!(history.history.total_drawn, 5);
    assert_eq!(history.history.remaining_numbers, 70);
    assert_eq!(history.history.last_number, Some(61));
    assert_eq!(history.history.numbers[0].number, 61);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_draws_never_repeat_and_stop_at_seventy_five() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Concorrência").await;
    draw_service::start_game(&state, game_id).await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                let mut results = Vec::new();
                for _ in 0..10 {
                    results.push(draw_service::draw_number(&state, game_id).await);
                }
                results
            })
        })
        .collect();

    let mut drawn = Vec::new();
    let mut exhausted = 0;
    for task in tasks {
        for result in task.await.unwrap() {
            match result {
                Ok(response) => drawn.push(response.number),
                Err(ServiceError::InvalidState(_)) => exhausted += 1,
                Err(other) => panic!("unexpected draw error: {other}"),
            }
        }
    }

    assert_eq!(drawn.len(), 75);
    assert_eq!(exhausted, 5);
    let unique: HashSet<u8> = drawn.iter().copied().collect();
    assert_eq!(unique.len(), 75);
    assert!(unique.iter().all(|number| (1..=75).contains(number)));
    assert_eq!(store.list_drawn_numbers(game_id).await.unwrap().len(), 75);

    let manual = draw_service::draw_manual_number(&state, game_id, DrawRequest::Manual(10))
        .await
        .unwrap_err();
    assert!(matches!(manual, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn duplicate_manual_number_leaves_the_drawn_set_untouched() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Manual").await;
    draw_service::start_game(&state, game_id).await.unwrap();

    draw_service::draw_manual_number(&state, game_id, DrawRequest::Manual(42))
        .await
        .unwrap();
    let err = draw_service::draw_manual_number(&state, game_id, DrawRequest::Manual(42))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let drawn = store.list_drawn_numbers(game_id).await.unwrap();
    assert_eq!(drawn.len(), 1);
    assert!(drawn[0].is_manual);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_award_a_tier_to_a_single_winner() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Disputa").await;
    let first = participant_with_known_card(&state, &store, game_id, "bia").await;
    let second = participant_with_known_card(&state, &store, game_id, "caio").await;
    draw_service::start_game(&state, game_id).await.unwrap();
    draw_first_row(&state, game_id).await;

    let attempts: Vec<_> = [first, second, first, second]
        .into_iter()
        .map(|participant_id| {
            let state = state.clone();
            tokio::spawn(async move {
                claim_service::validate_claim(&state, game_id, claim(participant_id, "line")).await
            })
        })
        .collect();

    let mut winners = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(matches!(err, ServiceError::InvalidState(_))),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn starting_a_game_finishes_the_active_one_and_clears_its_numbers() {
    let (state, store) = setup().await;
    let first = create_game(&state, "Primeiro").await;
    let second = create_game(&state, "Segundo").await;

    draw_service::start_game(&state, first).await.unwrap();
    for _ in 0..3 {
        draw_service::draw_number(&state, first).await.unwrap();
    }

    draw_service::start_game(&state, second).await.unwrap();

    let active = store
        .list_games_by_status(vec![GameStatus::Active])
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second);

    let superseded = store.find_game(first).await.unwrap().unwrap();
    assert_eq!(superseded.status, GameStatus::Finished);
    assert!(superseded.finished_at.is_some());
    assert!(store.list_drawn_numbers(first).await.unwrap().is_empty());

    let err = draw_service::draw_number(&state, first).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn reset_twice_yields_the_same_waiting_game() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Reset").await;
    draw_service::start_game(&state, game_id).await.unwrap();
    draw_service::draw_number(&state, game_id).await.unwrap();

    let first = draw_service::reset_game(&state, game_id, None).await.unwrap();
    let second = draw_service::reset_game(&state, game_id, None).await.unwrap();

    assert_eq!(first.game.status, "waiting");
    assert_eq!(second.game.status, "waiting");
    let game = store.find_game(game_id).await.unwrap().unwrap();
    assert_eq!(game.settings.last_number, None);
    assert!(game.started_at.is_none());
    assert!(store.list_drawn_numbers(game_id).await.unwrap().is_empty());

    draw_service::start_game(&state, game_id).await.unwrap();
    draw_service::draw_number(&state, game_id).await.unwrap();
}

/// Spawn `workers` tasks drawing until the game refuses, counting accepted draws.
fn spawn_drawers(
    state: &SharedState,
    game_id: Uuid,
    workers: usize,
    accepted: Arc<AtomicUsize>,
) -> Vec<tokio::task::JoinHandle<Vec<u8>>> {
    (0..workers)
        .map(|_| {
            let state = state.clone();
            let accepted = accepted.clone();
            tokio::spawn(async move {
                let mut numbers = Vec::new();
                loop {
                    match draw_service::draw_number(&state, game_id).await {
                        Ok(response) => {
                            numbers.push(response.number);
                            accepted.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(ServiceError::InvalidState(_)) => return numbers,
                        Err(other) => panic!("unexpected draw error: {other}"),
                    }
                }
            })
        })
        .collect()
}

async fn wait_for_draws(accepted: &AtomicUsize, at_least: usize) {
    while accepted.load(Ordering::SeqCst) < at_least {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn draws_racing_a_reset_never_survive_it() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Reset em andamento").await;
    draw_service::start_game(&state, game_id).await.unwrap();

    let accepted = Arc::new(AtomicUsize::new(0));
    let drawers = spawn_drawers(&state, game_id, 4, accepted.clone());
    wait_for_draws(&accepted, 3).await;

    let reset = draw_service::reset_game(&state, game_id, None).await.unwrap();
    assert_eq!(reset.game.status, "waiting");

    let mut succeeded = Vec::new();
    for drawer in drawers {
        succeeded.extend(drawer.await.unwrap());
    }
    assert!(succeeded.len() >= 3);
    let unique: HashSet<u8> = succeeded.iter().copied().collect();
    assert_eq!(unique.len(), succeeded.len());

    // Every accepted draw committed before the reset and was wiped by it.
    assert!(store.list_drawn_numbers(game_id).await.unwrap().is_empty());
    let game = store.find_game(game_id).await.unwrap().unwrap();
    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(game.settings.last_number, None);

    let err = draw_service::draw_number(&state, game_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn draws_racing_a_finish_are_all_kept_and_last_number_matches() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Final em andamento").await;
    draw_service::start_game(&state, game_id).await.unwrap();

    let accepted = Arc::new(AtomicUsize::new(0));
    let drawers = spawn_drawers(&state, game_id, 4, accepted.clone());
    wait_for_draws(&accepted, 3).await;

    draw_service::finish_game(&state, game_id).await.unwrap();

    let mut succeeded = HashSet::new();
    for drawer in drawers {
        succeeded.extend(drawer.await.unwrap());
    }

    let stored = store.list_drawn_numbers(game_id).await.unwrap();
    let stored_numbers: HashSet<u8> = stored.iter().map(|drawn| drawn.number).collect();
    assert_eq!(stored_numbers, succeeded);

    let game = store.find_game(game_id).await.unwrap().unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(
        game.settings.last_number,
        stored.last().map(|drawn| drawn.number)
    );

    let err = draw_service::draw_number(&state, game_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    assert_eq!(store.list_drawn_numbers(game_id).await.unwrap().len(), stored.len());
}

#[tokio::test]
async fn manual_and_random_draws_share_the_seventy_five_numbers() {
    let (state, store) = setup().await;
    let game_id = create_game(&state, "Misto").await;
    draw_service::start_game(&state, game_id).await.unwrap();

    let mut drawn = HashSet::new();
    let mut manual = 0;
    for step in 0..75 {
        let response = if step % 3 == 0 {
            let pick = (1..=75u8)
                .find(|number| !drawn.contains(number))
                .unwrap();
            manual += 1;
            draw_service::draw_manual_number(&state, game_id, DrawRequest::Manual(pick.into()))
                .await
                .unwrap()
        } else {
            draw_service::draw_number(&state, game_id).await.unwrap()
        };
        assert!(drawn.insert(response.number), "{} drawn twice", response.number);
        assert_eq!(response.total_drawn, drawn.len());
        assert_eq!(response.remaining, 75 - drawn.len());
    }
    assert_eq!(drawn.len(), 75);

    let random = draw_service::draw_number(&state, game_id).await.unwrap_err();
    assert!(matches!(random, ServiceError::InvalidState(_)));
    let manual_after = draw_service::draw_manual_number(&state, game_id, DrawRequest::Manual(5))
        .await
        .unwrap_err();
    assert!(matches!(manual_after, ServiceError::InvalidState(_)));

    let stored = store.list_drawn_numbers(game_id).await.unwrap();
    assert_eq!(stored.len(), 75);
    assert_eq!(stored.iter().filter(|drawn| drawn.is_manual).count(), manual);
}
