#[cfg(test)]
mod tests {
    use crate::battle::engine::Battle;
    use crate::battle::state::{BattleEvent, BattleState, Team};
    use crate::battle::tests::common::{
        assert_ok, basic_attack, create_test_battle, predictable_rng, turns_started,
        TestCreatureBuilder,
    };
    use crate::errors::{ActionError, BattleEngineError, BattleStateError};
    use crate::rules::GameRules;
    use pretty_assertions::assert_eq;
    use schema::ElementType;

    #[test]
    fn test_speed_tie_goes_to_team_a() {
        // Arrange
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire).build()];
        let mut team_b = vec![TestCreatureBuilder::new("mind", ElementType::Psychic).build()];
        let mut battle = create_test_battle(&mut team_a, &mut team_b, predictable_rng());

        // Act
        assert_ok(battle.start());

        // Assert
        assert_eq!(battle.state(), BattleState::InProgress);
        assert!(battle.is_team_a_turn());
        assert_eq!(battle.current_turn(), 1);
        assert_eq!(battle.active_index(Team::A), 0);
        assert_eq!(battle.active_index(Team::B), 0);
        assert_eq!(turns_started(&battle), vec![(1, Team::A)]);
    }

    #[test]
    fn test_faster_team_b_moves_first() {
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire).build()];
        let mut team_b = vec![TestCreatureBuilder::new("mind", ElementType::Psychic)
            .with_speed(11)
            .build()];
        let mut battle = create_test_battle(&mut team_a, &mut team_b, predictable_rng());

        assert_ok(battle.start());

        assert!(!battle.is_team_a_turn());
        assert_eq!(battle.current_team(), Team::B);
        assert_eq!(
            battle.events().events()[0],
            BattleEvent::BattleStarted {
                team_a: vec!["ember".to_string()],
                team_b: vec!["mind".to_string()],
                first: Team::B,
            }
        );
    }

    #[test]
    fn test_only_the_lead_creatures_decide_order() {
        // The bench creature on team B is fast, but only the leads are compared.
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire).build()];
        let mut team_b = vec![
            TestCreatureBuilder::new("mind", ElementType::Psychic).build(),
            TestCreatureBuilder::new("spark", ElementType::Electric)
                .with_speed(40)
                .build(),
        ];
        let mut battle = create_test_battle(&mut team_a, &mut team_b, predictable_rng());

        assert_ok(battle.start());

        assert!(battle.is_team_a_turn());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire).build()];
        let mut team_b = vec![TestCreatureBuilder::new("mind", ElementType::Psychic).build()];
        let mut battle = create_test_battle(&mut team_a, &mut team_b, predictable_rng());
        assert_ok(battle.start());
        let events_before = battle.events().len();

        let result = battle.start();

        assert_eq!(
            result,
            Err(BattleEngineError::BattleState(BattleStateError::AlreadyStarted))
        );
        assert_eq!(battle.events().len(), events_before);
        assert_eq!(battle.current_turn(), 1);
    }

    #[test]
    fn test_actions_before_start_are_rejected() {
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire).build()];
        let mut team_b = vec![TestCreatureBuilder::new("mind", ElementType::Psychic).build()];
        let mut battle = create_test_battle(&mut team_a, &mut team_b, predictable_rng());

        let not_running = Err(BattleEngineError::Action(ActionError::BattleNotInProgress));
        assert_eq!(
            battle.execute_attack(&basic_attack(ElementType::Fire)).map(|_| ()),
            not_running
        );
        assert_eq!(battle.pass_turn(), not_running);
        assert_eq!(battle.try_escape().map(|_| ()), not_running);
        assert_eq!(battle.state(), BattleState::NotStarted);
        assert!(battle.events().is_empty());
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire).build()];

        let result = Battle::new(
            team_a.iter_mut().collect(),
            Vec::new(),
            GameRules::default(),
            predictable_rng(),
        );

        assert!(matches!(result, Err(BattleStateError::EmptyRoster('B'))));
    }

    #[test]
    fn test_turn_start_restores_action_points() {
        // Arrange: the lead starts low on action points
        let mut team_a = vec![TestCreatureBuilder::new("ember", ElementType::Fire)
            .with_action_points(3)
            .build()];
        let mut team_b = vec![TestCreatureBuilder::new("mind", ElementType::Psychic).build()];
        let mut battle = create_test_battle(&mut team_a, &mut team_b, predictable_rng());

        // Act
        assert_ok(battle.start());

        // Assert: +2 at the start of its turn
        assert_eq!(battle.active_creature(Team::A).action_points(), 5);
        assert!(matches!(
            battle.events().events()[1],
            BattleEvent::TurnStarted {
                turn: 1,
                team: Team::A,
                action_points: 5,
                max_action_points: 10,
                ..
            }
        ));
    }
}
