mod fixtures;

mod table_tests;
