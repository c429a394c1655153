use creature_battle::{
    BattleListener, BattleManager, GameRules, HeuristicTrainer, Strategy, TurnRng,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SEED: u64 = 2024;
const MAX_ACTIONS: usize = 200;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rules = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| GameRules::from_ron_str(&text).map_err(|e| e.to_string()))
        {
            Ok(rules) => rules,
            Err(e) => {
                error!(%path, error = %e, "could not load rules");
                return;
            }
        },
        None => GameRules::default(),
    };

    let manager = BattleManager::new(rules);
    let mut rng = TurnRng::seeded(SEED);

    let mut red_team = vec![
        manager.spawn_creature("red_1", "Cinder", "Fire", 8, &mut rng),
        manager.spawn_creature("red_2", "Ripple", "Water", 7, &mut rng),
        manager.spawn_creature("red_3", "Pebble", "Ground", 7, &mut rng),
    ];
    let mut blue_team = vec![
        manager.spawn_creature("blue_1", "Thorn", "Nature", 8, &mut rng),
        manager.spawn_creature("blue_2", "Sparky", "Electric", 7, &mut rng),
        manager.spawn_creature("blue_3", "Gloom", "Dark", 7, &mut rng),
    ];

    let mut red = HeuristicTrainer::new("Red", 8, Strategy::Intelligent);
    let mut blue = HeuristicTrainer::new("Blue", 5, Strategy::Balanced);
    let mut listener = BattleListener::new();

    let result = {
        let mut battle = match manager.create_battle(&mut red_team, &mut blue_team, rng) {
            Ok(battle) => battle,
            Err(e) => {
                error!(error = %e, "could not create battle");
                return;
            }
        };
        battle.add_observer(Box::new(&mut listener));
        manager.run_battle(&mut battle, &mut red, &mut blue, MAX_ACTIONS)
    };

    match result {
        Ok(state) => info!(result = ?state, messages = listener.messages().len(), "battle finished"),
        Err(e) => error!(error = %e, "battle aborted"),
    }

    for creature in red_team.iter().chain(blue_team.iter()) {
        info!(%creature, "final state");
    }
}
