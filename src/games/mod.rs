pub mod carcassonne;
