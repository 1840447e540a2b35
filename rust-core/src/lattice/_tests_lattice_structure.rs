#[cfg(test)]
mod _tests_lattice_structure {
    use super::super::lattice_structure::LatticeStructure;
    use crate::config::LatticeConfig;
    use crate::error::DisorderError;
    use crate::interfaces::{Boundary, IndexSpace};

    fn chain(divisions: usize, boundary: Boundary) -> LatticeStructure {
        let config = LatticeConfig::new(vec![10])
            .with_divisions(vec![divisions])
            .with_boundary(vec![boundary]);
        LatticeStructure::from_config(&config).unwrap()
    }

    // ==================== Construction ====================

    #[test]
    fn test_chain_split_in_two() {
        let lattice = chain(2, Boundary::Periodic);
        assert_eq!(lattice.dimension(), 1);
        assert_eq!(lattice.domain_count(), 2);
        assert_eq!(lattice.cells_per_domain(), 5);
        assert_eq!(lattice.padded_volume(), 7);
        assert_eq!(lattice.global_volume(), 10);
        assert_eq!(lattice.tile_count(), 5);
    }

    #[test]
    fn test_uneven_split_is_rejected() {
        let config = LatticeConfig::new(vec![10]).with_divisions(vec![3]);
        assert!(matches!(
            LatticeStructure::from_config(&config),
            Err(DisorderError::Configuration(_))
        ));
    }

    #[test]
    fn test_stride_must_divide_domain() {
        let config = LatticeConfig::new(vec![10])
            .with_divisions(vec![2])
            .with_stride(vec![2]);
        assert!(LatticeStructure::from_config(&config).is_err());
    }

    #[test]
    fn test_orbital_count_must_match_positions() {
        let mut config = LatticeConfig::new(vec![4]).with_orbitals(vec![vec![0.0], vec![0.5]]);
        config.orbitals = 3;
        assert!(LatticeStructure::from_config(&config).is_err());
    }

    #[test]
    fn test_zero_ghosts_rejected() {
        let mut config = LatticeConfig::new(vec![4]);
        config.ghosts = 0;
        assert!(LatticeStructure::from_config(&config).is_err());
    }

    // ==================== Ownership ====================

    #[test]
    fn test_owner_domain_partitions_lattice() {
        let lattice = chain(2, Boundary::Periodic);
        assert_eq!(lattice.owner_domain(0), 0);
        assert_eq!(lattice.owner_domain(4), 0);
        assert_eq!(lattice.owner_domain(5), 1);
        assert_eq!(lattice.owner_domain(9), 1);

        for global in 0..lattice.global_volume() {
            let owners = lattice
                .domains()
                .filter(|d| d.owns_global(global))
                .count();
            assert_eq!(owners, 1, "global index {global}");
        }
    }

    #[test]
    fn test_ghost_layer() {
        let lattice = chain(2, Boundary::Periodic);
        let domain = lattice.domain(0);
        assert!(domain.is_ghost(0));
        assert!(domain.is_ghost(6));
        assert!((1..6).all(|p| !domain.is_ghost(p)));
    }

    #[test]
    fn test_periodic_ghosts_wrap() {
        let lattice = chain(2, Boundary::Periodic);
        let first = lattice.domain(0);
        assert_eq!(first.local_to_padded(0), 1);
        assert_eq!(first.padded_to_global(1), Some(0));
        assert_eq!(first.padded_to_global(6), Some(5));
        assert_eq!(first.padded_to_global(0), Some(9));

        let second = lattice.domain(1);
        assert_eq!(second.origin(), &[5]);
        assert_eq!(second.padded_to_global(0), Some(4));
        assert_eq!(second.padded_to_global(6), Some(0));
        assert_eq!(second.global_to_padded(5), Some(1));
        assert_eq!(second.global_to_padded(4), None);
    }

    #[test]
    fn test_open_ghosts_fall_off() {
        let lattice = chain(2, Boundary::Open);
        let first = lattice.domain(0);
        assert_eq!(first.padded_to_global(0), None);
        assert_eq!(first.padded_to_global(6), Some(5));
        assert_eq!(lattice.domain(1).padded_to_global(6), None);
    }

    #[test]
    fn test_orbital_is_slowest_digit() {
        let config = LatticeConfig::new(vec![4]).with_orbitals(vec![vec![0.0], vec![0.5]]);
        let lattice = LatticeStructure::from_config(&config).unwrap();
        let domain = lattice.domain(0);
        assert_eq!(lattice.padded_volume(), 12);
        // cell 1, orbital 1
        assert_eq!(domain.global_to_padded(5), Some(8));
        assert_eq!(domain.padded_to_global(8), Some(5));
        // ghost of orbital 1 wraps to cell 3
        assert_eq!(domain.padded_to_global(6), Some(7));
    }

    // ==================== Tiles & index spaces ====================

    #[test]
    fn test_tiles_in_two_dimensions() {
        let config = LatticeConfig::new(vec![6, 4]).with_stride(vec![2, 2]);
        let lattice = LatticeStructure::from_config(&config).unwrap();
        let domain = lattice.domain(0);
        assert_eq!(lattice.tile_count(), 6);

        // local cell (4, 3)
        let local = 4 + 6 * 3;
        assert_eq!(domain.index_to_tile(local), 5);
        let padded = domain.local_to_padded(local);
        assert_eq!(padded, 5 + 8 * 4);
        assert_eq!(domain.tile_of_padded(padded), Some(5));
        assert_eq!(domain.padded_to_local(padded), Some(local));
        assert_eq!(domain.tile_of_padded(0), None);
    }

    #[test]
    fn test_convert_between_spaces() {
        let lattice = chain(2, Boundary::Periodic);
        let domain = lattice.domain(1);
        assert_eq!(
            domain.convert(2, IndexSpace::LocalCell, IndexSpace::Global),
            Some(7)
        );
        assert_eq!(
            domain.convert(7, IndexSpace::Global, IndexSpace::LocalCell),
            Some(2)
        );
        assert_eq!(
            domain.convert(3, IndexSpace::Global, IndexSpace::Padded),
            None
        );
        assert_eq!(
            domain.convert(3, IndexSpace::Tile, IndexSpace::Global),
            None
        );
        assert_eq!(
            domain.convert(3, IndexSpace::Padded, IndexSpace::Padded),
            Some(3)
        );
    }

    #[test]
    fn test_node_index_stays_in_padded_space() {
        let lattice = chain(2, Boundary::Periodic);
        let domain = lattice.domain(0);
        assert_eq!(domain.node_index(5, 1), Some(6));
        assert_eq!(domain.node_index(6, 1), None);
        assert_eq!(domain.node_index(0, -1), None);
    }

    // ==================== Vectors ====================

    #[test]
    fn test_gather_fills_ghosts() {
        let lattice = chain(2, Boundary::Periodic);
        let psi: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let local = lattice.domain(1).gather(&psi);
        assert_eq!(local, vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 0.0]);

        let open = chain(2, Boundary::Open);
        let local = open.domain(0).gather(&psi);
        assert_eq!(local, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_scatter_writes_owned_only() {
        let lattice = chain(2, Boundary::Periodic);
        let mut global = vec![0.0; 10];
        let local = vec![-1.0, 1.0, 2.0, 3.0, 4.0, 5.0, -1.0];
        lattice.domain(1).scatter_owned(&local, &mut global);
        assert_eq!(global, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
