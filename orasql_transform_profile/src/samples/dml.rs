// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::Unit;

pub const EMP_DML_PKG: Unit = (
    "hr",
    "emp_dml_pkg",
    "PACKAGE BODY emp_dml_pkg IS\n\
     PROCEDURE hire(p_emp_id NUMBER, p_dept NUMBER, p_salary NUMBER) IS\n\
     BEGIN\n\
     INSERT INTO hr.employees (emp_id, dept_id, salary) VALUES (p_emp_id, p_dept, p_salary);\n\
     IF SQL%ROWCOUNT = 0 THEN\n\
     RAISE_APPLICATION_ERROR(-20001, 'hire failed');\n\
     END IF;\n\
     END hire;\n\
     PROCEDURE give_raise(p_emp_id NUMBER, p_pct NUMBER) IS\n\
     BEGIN\n\
     UPDATE hr.employees SET salary = salary * (1 + p_pct / 100) WHERE emp_id = p_emp_id;\n\
     IF SQL%NOTFOUND THEN\n\
     RAISE_APPLICATION_ERROR(-20002, 'employee not found');\n\
     END IF;\n\
     END give_raise;\n\
     PROCEDURE terminate(p_emp_id NUMBER) IS\n\
     BEGIN\n\
     DELETE FROM hr.employees WHERE emp_id = p_emp_id;\n\
     END terminate;\n\
     END emp_dml_pkg;",
);
