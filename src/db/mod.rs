pub mod db;
pub mod cache;
pub mod userdb;
pub mod profiledb;
pub mod jobdb;
pub mod applicationdb;
pub mod activitydb;

#[cfg(test)]
pub mod test_support;
