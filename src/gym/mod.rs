pub mod random_arena;

pub use random_arena::RandomArena;
