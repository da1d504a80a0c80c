use std::error::Error;

use super::DeriveCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::query::QueryRequest;
use crate::query::derived::DerivedQuery;
use crate::query::statement::Page;
use crate::types::CompileResult;

impl Execute for DeriveCmd {
    type Output = CompileResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let page = self
            .page
            .zip(self.size)
            .map(|(number, size)| Page::new(number, size));

        let request = QueryRequest::Derived(DerivedQuery {
            entity: self.entity,
            method: self.method,
            args: self.args,
            page,
        });

        CompileResult::compile(&request, config, self.count)
    }
}
