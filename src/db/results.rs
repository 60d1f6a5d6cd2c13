//! Substitutions produced by evaluating a formula.
//!
//! A result list is a table with one column per distinct free variable of the
//! formula it comes from. Columns are in the order of the first depth-first,
//! left-to-right occurrence of the variables in the formula (see
//! [`Formula::vars`][vars]), whatever the order in which the query engine
//! discovered them. Grounding code zips rows against that order, so a result
//! list must never expose any other one.
//!
//! [vars]: ../../logic/formula/enum.Formula.html#method.vars (vars function)

use crate::common::*;

/// Substitutions satisfying a formula.
pub trait ResultList {
    /// Number of substitutions.
    fn size(&self) -> usize;

    /// Number of distinct free variables of the originating formula.
    fn arity(&self) -> usize;

    /// Free variables of the originating formula, in column order.
    fn vars(&self) -> &[Var];

    /// Value of a variable in some row.
    ///
    /// Fails with [`ErrorKind::Index`][index] if `row` is out of range, and with
    /// [`ErrorKind::InvalidVariable`][var] if `var` is not free in the
    /// originating formula.
    ///
    /// [index]: ../../errors/enum.ErrorKind.html#variant.Index
    /// (ErrorKind's Index variant)
    /// [var]: ../../errors/enum.ErrorKind.html#variant.InvalidVariable
    /// (ErrorKind's InvalidVariable variant)
    fn get(&self, row: usize, var: &Var) -> Res<&Cst>;

    /// All the values of a row, one per variable in column order.
    ///
    /// Fails with [`ErrorKind::Index`][index] if `row` is out of range.
    ///
    /// [index]: ../../errors/enum.ErrorKind.html#variant.Index
    /// (ErrorKind's Index variant)
    fn get_row(&self, row: usize) -> Res<&[Cst]>;
}

/// Immutable table of substitutions.
///
/// Built row by row with [`push`](#method.push) by whoever evaluates the
/// formula, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitutions {
    /// Variables, in column order.
    vars: Vec<Var>,
    /// Maps variables to their column.
    columns: HashMap<Var, usize>,
    /// Number of rows.
    size: usize,
    /// Values, row after row.
    values: Vec<Cst>,
}

impl Substitutions {
    /// Empty table for the free variables of a formula.
    pub fn new(formula: &Formula) -> Self {
        Self::of_vars(formula.vars())
    }

    /// Empty table for some variables, assumed distinct and in formula order.
    fn of_vars(vars: Vec<Var>) -> Self {
        let columns = vars
            .iter()
            .enumerate()
            .map(|(col, var)| (var.clone(), col))
            .collect();
        Substitutions {
            vars,
            columns,
            size: 0,
            values: vec![],
        }
    }

    /// Builds a table from rows whose columns are in some arbitrary order.
    ///
    /// `columns` gives the variable of each column of the input rows. Rows are
    /// permuted into formula order. Fails with
    ///
    /// - [`ErrorKind::InvalidVariable`][var] if a column is not free in the
    ///   formula, appears twice, or if a free variable has no column,
    /// - [`ErrorKind::Arity`][arity] if a row does not have one value per
    ///   column.
    ///
    /// [var]: ../../errors/enum.ErrorKind.html#variant.InvalidVariable
    /// (ErrorKind's InvalidVariable variant)
    /// [arity]: ../../errors/enum.ErrorKind.html#variant.Arity
    /// (ErrorKind's Arity variant)
    pub fn of_columns<Rows>(formula: &Formula, columns: &[Var], rows: Rows) -> Res<Self>
    where
        Rows: IntoIterator<Item = Vec<Cst>>,
    {
        let mut res = Self::new(formula);

        // `perm[col]` is the column of the `col`-th variable in the input rows.
        let mut perm: Vec<Option<usize>> = vec![None; res.arity()];
        for (input_col, var) in columns.iter().enumerate() {
            match res.columns.get(var) {
                Some(&col) if perm[col].is_none() => perm[col] = Some(input_col),
                Some(_) => bail!(ErrorKind::InvalidVariable(format!(
                    "{} (duplicate column)",
                    var
                ))),
                None => bail!(ErrorKind::InvalidVariable(var.name().into())),
            }
        }
        let mut perm_complete = Vec::with_capacity(perm.len());
        for (col, input_col) in perm.into_iter().enumerate() {
            match input_col {
                Some(input_col) => perm_complete.push(input_col),
                None => bail!(ErrorKind::InvalidVariable(format!(
                    "{} (missing column)",
                    res.vars[col]
                ))),
            }
        }

        for row in rows {
            if row.len() != columns.len() {
                bail!(ErrorKind::Arity(columns.len(), row.len()))
            }
            let row = perm_complete
                .iter()
                .map(|input_col| row[*input_col].clone())
                .collect();
            res.push(row)?
        }

        Ok(res)
    }

    /// Adds a row, values in column order.
    ///
    /// Fails if the row does not have one value per variable.
    pub fn push(&mut self, row: Vec<Cst>) -> Res<()> {
        if row.len() != self.arity() {
            bail!(ErrorKind::Arity(self.arity(), row.len()))
        }
        self.values.extend(row);
        self.size += 1;
        Ok(())
    }

    /// Column of a variable.
    pub fn column(&self, var: &Var) -> Option<usize> {
        self.columns.get(var).cloned()
    }

    /// Fails if a row is out of range.
    fn check_row(&self, row: usize) -> Res<()> {
        if row >= self.size {
            bail!(ErrorKind::Index(row, self.size))
        }
        Ok(())
    }

    /// Rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &[Cst]> + '_ {
        let arity = self.arity();
        (0..self.size).map(move |row| &self.values[row * arity..(row + 1) * arity])
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl ResultList for Substitutions {
    fn size(&self) -> usize {
        self.size
    }

    fn arity(&self) -> usize {
        self.vars.len()
    }

    fn vars(&self) -> &[Var] {
        &self.vars
    }

    fn get(&self, row: usize, var: &Var) -> Res<&Cst> {
        self.check_row(row)?;
        let col = if let Some(col) = self.column(var) {
            col
        } else {
            bail!(ErrorKind::InvalidVariable(var.name().into()))
        };
        Ok(&self.values[row * self.arity() + col])
    }

    fn get_row(&self, row: usize) -> Res<&[Cst]> {
        self.check_row(row)?;
        let arity = self.arity();
        Ok(&self.values[row * arity..(row + 1) * arity])
    }
}

impl fmt::Display for Substitutions {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "|")?;
        for var in &self.vars {
            write!(fmt, " {} |", var)?
        }
        for row in self.iter() {
            write!(fmt, "\n|")?;
            for val in row {
                write!(fmt, " {} |", val)?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn p_and_q() -> Formula {
        let (p, q) = (Pred::new("P", 2), Pred::new("Q", 2));
        Formula::and(vec![
            Formula::atom(&p, vec![Term::var("x"), Term::var("y")]).unwrap(),
            Formula::atom(&q, vec![Term::var("y"), Term::var("z")]).unwrap(),
        ])
    }

    fn row(vals: &[&str]) -> Vec<Cst> {
        vals.iter().map(|val| Cst::from(*val)).collect()
    }

    #[test]
    fn formula_order() {
        let mut subst = Substitutions::new(&p_and_q());
        assert_eq!(subst.arity(), 3);
        assert_eq!(subst.size(), 0);
        assert_eq!(
            subst.vars(),
            &[Var::new("x"), Var::new("y"), Var::new("z")][..]
        );

        subst.push(row(&["a", "b", "c"])).unwrap();
        subst.push(row(&["d", "e", "f"])).unwrap();
        assert_eq!(subst.size(), 2);

        for r in 0..subst.size() {
            let values = subst.get_row(r).unwrap();
            assert_eq!(values.len(), subst.arity());
            for (i, var) in subst.vars().iter().enumerate() {
                assert_eq!(subst.get(r, var).unwrap(), &values[i])
            }
        }
        assert_eq!(subst.get(1, &Var::new("y")).unwrap(), &Cst::from("e"))
    }

    #[test]
    fn bad_accesses() {
        let mut subst = Substitutions::new(&p_and_q());
        assert!(subst.get_row(0).unwrap_err().is_index());
        subst.push(row(&["a", "b", "c"])).unwrap();

        let err = subst.get_row(1).unwrap_err();
        assert!(err.is_index());
        match err.kind() {
            ErrorKind::Index(1, 1) => (),
            kind => panic!("unexpected error kind {:?}", kind),
        }
        assert!(subst.get(7, &Var::new("x")).unwrap_err().is_index());
        assert!(subst
            .get(0, &Var::new("w"))
            .unwrap_err()
            .is_invalid_variable());

        assert!(subst.push(row(&["a", "b"])).unwrap_err().is_arity());
        assert_eq!(subst.size(), 1)
    }

    #[test]
    fn engine_columns() {
        let formula = p_and_q();
        let columns = vec![Var::new("z"), Var::new("x"), Var::new("y")];
        let subst = Substitutions::of_columns(
            &formula,
            &columns,
            vec![row(&["c", "a", "b"]), row(&["f", "d", "e"])],
        )
        .unwrap();
        let rows: Vec<_> = subst.iter().map(|r| r.to_vec()).collect();
        assert_eq!(rows, vec![row(&["a", "b", "c"]), row(&["d", "e", "f"])]);
    }

    #[test]
    fn bad_engine_columns() {
        let formula = p_and_q();
        let (x, y, z, w) = (Var::new("x"), Var::new("y"), Var::new("z"), Var::new("w"));

        for columns in &[
            vec![x.clone(), y.clone()],
            vec![x.clone(), y.clone(), z.clone(), w],
            vec![x.clone(), y.clone(), y.clone()],
        ] {
            let err = Substitutions::of_columns(&formula, columns, vec![]).unwrap_err();
            assert!(err.is_invalid_variable(), "{:?}: {}", columns, err)
        }

        let err = Substitutions::of_columns(&formula, &[x, y, z], vec![row(&["a", "b"])])
            .unwrap_err();
        assert!(err.is_arity())
    }

    #[test]
    fn ground_formula() {
        let p = Pred::new("P", 1);
        let formula = Formula::atom(&p, vec![Term::cst("a")]).unwrap();
        let mut subst = Substitutions::new(&formula);
        assert_eq!(subst.arity(), 0);
        subst.push(vec![]).unwrap();
        assert_eq!(subst.size(), 1);
        assert!(subst.get_row(0).unwrap().is_empty());
        assert_eq!(subst.iter().count(), 1)
    }

    #[test]
    fn shareable() {
        fn check<T: Send + Sync>() {}
        check::<Substitutions>()
    }
}
