mod common;

#[cfg(test)]
mod test_battle_start;
