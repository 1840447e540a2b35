#[cfg(test)]
mod _tests_placement {
    use super::super::placement::*;
    use crate::config::LatticeConfig;
    use crate::error::DisorderError;
    use crate::lattice::LatticeStructure;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lattice(size: Vec<usize>, stride: Vec<usize>) -> LatticeStructure {
        let config = LatticeConfig::new(size).with_stride(stride);
        LatticeStructure::from_config(&config).unwrap()
    }

    #[test]
    fn test_target_is_floor_of_expected_count() {
        assert_eq!(target_count(0.2, 10), 2);
        assert_eq!(target_count(0.29, 10), 2);
        assert_eq!(target_count(0.05, 32), 1);
        assert_eq!(target_count(0.01, 50), 0);
        assert_eq!(target_count(1.0, 10), 10);
        assert_eq!(default_attempt_budget(2), 2 * 64 + 1024);
    }

    #[test]
    fn test_target_truncates_floating_point_product() {
        // 0.29 * 100 evaluates to 28.999999999999996
        assert_eq!(target_count(0.29, 100), 28);
        assert_eq!(target_count(0.57, 100), 56);
        // 0.07 * 100 evaluates to 7.000000000000001
        assert_eq!(target_count(0.07, 100), 7);
    }

    #[test]
    fn test_places_exact_number_of_distinct_roots() {
        let lattice = lattice(vec![10], vec![1]);
        let domain = lattice.domain(0);
        let mut placed = PlacedDefectSet::new(lattice.tile_count());

        for seed in 0..20 {
            placed.clear();
            let mut rng = StdRng::seed_from_u64(seed);
            place_defects(&mut placed, &domain, 0.2, None, &mut rng).unwrap();
            assert_eq!(placed.len(), 2);
            for (tile, root) in placed.iter() {
                assert!(!domain.is_ghost(root));
                assert_eq!(domain.tile_of_padded(root), Some(tile));
            }
        }
    }

    #[test]
    fn test_full_concentration_fills_every_cell() {
        let lattice = lattice(vec![10], vec![2]);
        let domain = lattice.domain(0);
        let mut placed = PlacedDefectSet::new(lattice.tile_count());
        let mut rng = StdRng::seed_from_u64(3);

        place_defects(&mut placed, &domain, 1.0, None, &mut rng).unwrap();

        let roots: Vec<usize> = placed.iter().map(|(_, root)| root).collect();
        assert_eq!(roots, (1..=10).collect::<Vec<_>>());
        assert_eq!(placed.tile(0).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_roots_sorted_within_tiles() {
        let lattice = lattice(vec![8, 8], vec![4, 4]);
        let domain = lattice.domain(0);
        let mut placed = PlacedDefectSet::new(lattice.tile_count());
        let mut rng = StdRng::seed_from_u64(11);

        place_defects(&mut placed, &domain, 0.5, None, &mut rng).unwrap();

        assert_eq!(placed.len(), 32);
        assert_eq!(placed.tile_count(), 4);
        for tile in 0..placed.tile_count() {
            let roots: Vec<usize> = placed.tile(tile).collect();
            assert!(roots.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_exhaustion_is_reported() {
        let lattice = lattice(vec![10], vec![1]);
        let domain = lattice.domain(0);
        let mut placed = PlacedDefectSet::new(lattice.tile_count());
        let mut rng = StdRng::seed_from_u64(5);

        let result = place_defects(&mut placed, &domain, 1.0, Some(1), &mut rng);
        match result {
            Err(DisorderError::PlacementExhaustion {
                requested,
                placed: count,
                attempts,
            }) => {
                assert_eq!(requested, 10);
                assert_eq!(count, 1);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut placed = PlacedDefectSet::new(2);
        assert!(placed.insert(1, 7));
        assert!(!placed.insert(1, 7));
        assert!(placed.insert(0, 7));
        assert_eq!(placed.len(), 2);
        placed.clear();
        assert!(placed.is_empty());
        assert_eq!(placed.tile_count(), 2);
    }
}
