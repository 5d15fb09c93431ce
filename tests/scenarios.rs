use proptest::prelude::*;
use q_snake::game::{
    Direction, GameConfig, GameEngine, Item, ItemKind, Occupant, Position, Snake, TerminalCause,
    World,
};
use q_snake::modes::{PlayConfig, PlayMode, TrainConfig, TrainMode};
use q_snake::rl::{LoopGuard, Observation, QAgent, QLearningConfig, QTable, load_replay};
use tempfile::TempDir;

fn engine(config: GameConfig) -> GameEngine {
    GameEngine::with_seed(config, 2024).unwrap()
}

fn centered_world(config: &GameConfig) -> World {
    let mut world = World::new(config.grid_width, config.grid_height);
    let center = world.grid().center();
    world.add(Snake::new(center, Direction::East, config.initial_segments));
    world
}

#[test]
fn moving_east_into_open_cell() {
    let config = GameConfig::default();
    let mut engine = engine(config.clone());
    let mut world = centered_world(&config);
    let before = world.snake().unwrap().clone();

    let result = engine.step(&mut world, Direction::East).unwrap();

    let snake = world.snake().unwrap();
    assert!(!result.is_terminal());
    assert_eq!(snake.head(), before.head().moved_by(1, 0));
    assert_eq!(snake.segments().len(), before.segments().len());
    assert_eq!(result.reward, config.rewards.step_reward);
}

#[test]
fn eating_a_beneficial_item_worth_fifty() {
    let config = GameConfig::default();
    let mut engine = engine(config.clone());
    let mut world = centered_world(&config);
    let target = world.snake().unwrap().head().moved_in_direction(Direction::East);
    let item = world.add(Item::beneficial(50.0).at(target));
    let size = world.snake().unwrap().size();

    let result = engine.step(&mut world, Direction::East).unwrap();

    assert_eq!(result.info.ate, Some(ItemKind::Beneficial));
    assert!(result.reward >= 50.0);
    assert_eq!(world.snake().unwrap().size(), size + 1);

    let relocated = world.get(item).unwrap().position();
    assert_ne!(relocated, target);
    assert!(!world.grid().is_wall(relocated));
    assert!(!world.snake().unwrap().occupies(relocated));
}

#[test]
fn detrimental_item_shrinks_by_one() {
    let config = GameConfig::default();
    let mut engine = engine(config.clone());
    let mut world = centered_world(&config);
    let target = world.snake().unwrap().head().moved_in_direction(Direction::East);
    world.add(Item::detrimental(-15.0).at(target));
    let size = world.snake().unwrap().size();

    let result = engine.step(&mut world, Direction::East).unwrap();

    assert!(!result.is_terminal());
    assert_eq!(world.snake().unwrap().size(), size - 1);
}

#[test]
fn running_into_own_body_reports_final_size_five() {
    let config = GameConfig::default();
    let mut engine = engine(config);
    let mut world = World::new(10, 10);
    world.add(Snake::new(Position::new(5, 5), Direction::East, 4));

    let mut outcome = None;
    for direction in [Direction::South, Direction::West, Direction::North] {
        let result = engine.step(&mut world, direction).unwrap();
        if let Some(cause) = result.terminal_cause() {
            outcome = Some((cause, result.info.size));
            break;
        }
    }

    assert_eq!(outcome, Some((TerminalCause::SelfCollision, 5)));
    assert_eq!(world.snake().unwrap().size(), 5);
}

#[test]
fn moving_into_own_tail_is_a_collision() {
    let mut engine = engine(GameConfig::default());
    let mut world = World::new(10, 10);
    // Coiled so the tail sits right next to the head
    let segments = [Position::new(5, 6), Position::new(6, 6), Position::new(6, 5)];
    world.add(Snake::from_parts(Position::new(5, 5), segments, Direction::North));
    let tail = *world.snake().unwrap().segments().back().unwrap();
    assert_eq!(tail, Position::new(5, 5).moved_in_direction(Direction::East));

    let result = engine.step(&mut world, Direction::East).unwrap();

    assert_eq!(result.terminal_cause(), Some(TerminalCause::SelfCollision));
    assert_eq!(result.info.size, 4);
    let snake = world.snake().unwrap();
    assert!(!snake.is_alive());
    assert_eq!(snake.head(), Position::new(5, 5));
    assert!(snake.segments().iter().eq(segments.iter()));
}

#[test]
fn zero_exploration_is_deterministic_argmax() {
    let mut agent = QAgent::with_seed(QLearningConfig::default(), 9).unwrap();
    let state = Observation::from_key("100010001100").unwrap();
    let next = Observation::from_key("001001001001").unwrap();
    agent.update(state, 3, 40.0, &next);
    agent.update_terminal(state, 0, -15.0);

    let expected = agent.table().best_action(&state);
    assert_eq!(expected, 3);
    for _ in 0..200 {
        assert_eq!(agent.select_action(&state, 0.0), expected);
    }
}

#[test]
fn unseen_pairs_return_the_default() {
    let table = QTable::new(10.0);
    let state = Observation::from_key("000000000000").unwrap();
    for action in 0..Direction::COUNT {
        assert_eq!(table.get(&state, action), 10.0);
    }
}

#[test]
fn train_then_play_from_saved_table() {
    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("q_table.json");
    let replay_path = dir.path().join("replay.json");

    let mut train = TrainConfig::new(30, table_path.clone());
    train.seed = Some(1);
    train.checkpoint_frequency = 0;
    train.log_frequency = 10;
    train.max_steps_per_episode = Some(300);
    TrainMode::new(train).unwrap().run().unwrap();

    let mut play = PlayConfig::new(table_path);
    play.num_episodes = 2;
    play.seed = Some(2);
    play.max_steps_per_episode = Some(300);
    play.replay_path = Some(replay_path.clone());
    let reports = PlayMode::new(play).unwrap().run().unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.final_size >= 1));
    assert_eq!(load_replay(&replay_path).unwrap().len(), 2);
}

proptest! {
    #[test]
    fn loop_breaking_never_reverses_while_alternatives_exist(
        x in 1..=10i32,
        y in 1..=10i32,
        last in 0..4usize,
        current in 0..4usize,
        seed in any::<u64>(),
    ) {
        let last = Direction::from_index(last).unwrap();
        let current = Direction::from_index(current).unwrap();
        let mut world = World::new(10, 10);
        world.add(Snake::from_parts(Position::new(x, y), Vec::new(), last));
        let mut guard = LoopGuard::with_seed(15, seed);

        let head = Position::new(x, y);
        let alternatives = Direction::ALL
            .into_iter()
            .filter(|d| *d != current && !d.is_opposite(last))
            .any(|d| !world.grid().is_wall(head.moved_in_direction(d)));

        let choice = guard.break_loop(&world, current);

        prop_assert_ne!(choice, current);
        if alternatives {
            prop_assert!(!choice.is_opposite(last));
            prop_assert!(!world.grid().is_wall(head.moved_in_direction(choice)));
        }
    }
}
