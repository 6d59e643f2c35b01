pub mod usermodel;
pub mod profilemodel;
pub mod jobmodel;
